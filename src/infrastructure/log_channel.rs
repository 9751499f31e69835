//! Dry-run channel that logs instead of sending.

use crate::application::ports::DispatchChannel;
use crate::domain::message::{SmsMessage, Summarize};
use crate::domain::recipient::{RecipientKey, Redaction};
use async_trait::async_trait;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Receipt for a message accepted by [`LogChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogReceipt {
    /// 1-based position of this message in the channel's output
    pub sequence: u64,
}

/// Channel that writes each message to the log and always succeeds.
///
/// Useful in development and staging, where real delivery would cost money
/// or reach real phones.
#[derive(Debug)]
pub struct LogChannel {
    name: String,
    redaction: Redaction,
    sent: AtomicU64,
}

impl LogChannel {
    /// Create a new LogChannel with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            redaction: Redaction::default(),
            sent: AtomicU64::new(0),
        }
    }

    /// Set how recipients appear in the log.
    pub fn with_redaction(mut self, redaction: Redaction) -> Self {
        self.redaction = redaction;
        self
    }

    /// Channel name, included in every log line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of messages logged so far.
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DispatchChannel for LogChannel {
    type Payload = SmsMessage;
    type Response = LogReceipt;
    type Error = Infallible;

    async fn send(
        &self,
        recipient: &RecipientKey,
        payload: &SmsMessage,
    ) -> Result<LogReceipt, Infallible> {
        let sequence = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            channel = %self.name,
            sequence,
            recipient = %self.redaction.apply(recipient),
            payload = %payload.summary(),
            "message logged instead of sent"
        );
        Ok(LogReceipt { sequence })
    }
}

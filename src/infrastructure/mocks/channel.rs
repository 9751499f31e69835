//! Mock dispatch channel for testing.

use crate::application::ports::DispatchChannel;
use crate::domain::recipient::RecipientKey;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Receipt returned by [`MockChannel`] on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockReceipt {
    /// 1-based number of this call on the channel
    pub sequence: u64,
}

/// Failure produced by [`MockChannel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MockChannelError(pub String);

#[derive(Debug, Clone)]
enum Behavior {
    Succeed,
    Fail(String),
    FailFirst(u64, String),
}

/// Channel test double that records every call.
///
/// Clones share the call log.
///
/// # Example
/// ```
/// use dispatch_throttle::infrastructure::mocks::MockChannel;
/// use dispatch_throttle::{DispatchChannel, RecipientKey};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let channel = MockChannel::failing("gateway down");
/// let key = RecipientKey::new("+15550100").unwrap();
///
/// let err = channel.send(&key, &"hi".to_string()).await.unwrap_err();
/// assert_eq!(err.to_string(), "gateway down");
/// assert_eq!(channel.call_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockChannel {
    behavior: Behavior,
    calls: Arc<AtomicU64>,
    sent: Arc<Mutex<Vec<(RecipientKey, String)>>>,
}

impl MockChannel {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicU64::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A channel that accepts every message.
    pub fn succeeding() -> Self {
        Self::with_behavior(Behavior::Succeed)
    }

    /// A channel that fails every call with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// A channel that fails the first `n` calls with `message`, then succeeds.
    pub fn failing_first(n: u64, message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::FailFirst(n, message.into()))
    }

    /// Number of times `send` has been invoked.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every `(recipient, payload)` passed to `send`, in call order.
    pub fn sent(&self) -> Vec<(RecipientKey, String)> {
        self.sent
            .lock()
            .expect("MockChannel mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }
}

#[async_trait]
impl DispatchChannel for MockChannel {
    type Payload = String;
    type Response = MockReceipt;
    type Error = MockChannelError;

    async fn send(
        &self,
        recipient: &RecipientKey,
        payload: &String,
    ) -> Result<MockReceipt, MockChannelError> {
        let sequence = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent
            .lock()
            .expect("MockChannel mutex poisoned - a test thread panicked while holding the lock")
            .push((recipient.clone(), payload.clone()));

        match &self.behavior {
            Behavior::Succeed => Ok(MockReceipt { sequence }),
            Behavior::Fail(message) => Err(MockChannelError(message.clone())),
            Behavior::FailFirst(n, message) if sequence <= *n => {
                Err(MockChannelError(message.clone()))
            }
            Behavior::FailFirst(..) => Ok(MockReceipt { sequence }),
        }
    }
}

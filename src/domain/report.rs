//! Failure telemetry events.

use serde::Serialize;
use std::time::SystemTime;

/// A delivery failure, as handed to an [`ErrorReporter`](crate::ErrorReporter).
///
/// The recipient has already been rendered through the dispatcher's
/// [`Redaction`](crate::Redaction) policy, and the payload is represented by
/// its summary only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    /// Redacted recipient key
    pub recipient: String,
    /// Display form of the channel error
    pub error: String,
    /// Short, non-sensitive description of the payload
    pub payload: String,
    /// Wall-clock time of the failure
    pub occurred_at: SystemTime,
}

impl FailureReport {
    /// Create a report stamped with the current wall-clock time.
    pub fn new(
        recipient: impl Into<String>,
        error: &dyn std::error::Error,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            error: error.to_string(),
            payload: payload.into(),
            occurred_at: SystemTime::now(),
        }
    }
}

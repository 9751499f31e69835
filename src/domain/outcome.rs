//! Outcome taxonomy for dispatch attempts.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result of one dispatch attempt: the channel's response on success.
pub type DispatchResult<R, E> = Result<R, DispatchError<E>>;

/// Classification of dispatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Local and expected: the recipient's window is full.
    RateLimitExceeded,
    /// The external channel failed; reported, then surfaced.
    ChannelFailure,
    /// Invalid limiter parameters, raised at construction only.
    Configuration,
}

impl ErrorKind {
    /// Stable snake_case name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RateLimitExceeded => "rate_limit_exceeded",
            ErrorKind::ChannelFailure => "channel_failure",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a dispatch attempt.
///
/// `E` is the channel's own error type, preserved untouched so callers can
/// inspect provider-specific detail.
#[derive(Debug, Error)]
pub enum DispatchError<E>
where
    E: std::error::Error + 'static,
{
    /// The recipient has used up its quota for the current window.
    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimitExceeded {
        /// Time until a slot frees up.
        retry_after: Duration,
    },
    /// The channel rejected or failed to deliver the message.
    #[error("channel failure: {0}")]
    ChannelFailure(#[source] E),
}

impl<E> DispatchError<E>
where
    E: std::error::Error + 'static,
{
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::RateLimitExceeded { .. } => ErrorKind::RateLimitExceeded,
            DispatchError::ChannelFailure(_) => ErrorKind::ChannelFailure,
        }
    }

    /// The channel's error, if the channel was invoked.
    pub fn channel_error(&self) -> Option<&E> {
        match self {
            DispatchError::ChannelFailure(e) => Some(e),
            DispatchError::RateLimitExceeded { .. } => None,
        }
    }

    /// Suggested wait before retrying, if rate limited.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            DispatchError::RateLimitExceeded { retry_after } => Some(*retry_after),
            DispatchError::ChannelFailure(_) => None,
        }
    }

    /// Terminal state of the attempt that produced this error.
    pub fn outcome(&self) -> Outcome {
        match self {
            DispatchError::RateLimitExceeded { .. } => Outcome::RateLimited,
            DispatchError::ChannelFailure(_) => Outcome::Failed,
        }
    }
}

/// Terminal state of a dispatch attempt.
///
/// Each attempt moves `Requested -> RateLimited` or
/// `Requested -> ChannelInvoked -> Succeeded | Failed`; only the terminal
/// state is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Rejected by the limiter; the channel was not invoked.
    RateLimited,
    /// The channel accepted the message.
    Succeeded,
    /// The channel was invoked and failed.
    Failed,
}

impl Outcome {
    /// Stable snake_case name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::RateLimited => "rate_limited",
            Outcome::Succeeded => "succeeded",
            Outcome::Failed => "failed",
        }
    }

    /// Whether the channel was invoked for this attempt.
    pub fn channel_invoked(&self) -> bool {
        !matches!(self, Outcome::RateLimited)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! # dispatch-throttle
//!
//! Per-recipient rate limiting and failure reporting for outbound messages.
//!
//! This crate sits between your application and an unreliable delivery
//! channel (an SMS gateway, a mailer, a push service). Every send is checked
//! against a sliding window kept per recipient: at most `limit` sends are
//! admitted within any trailing `period`. Admitted sends go to the channel;
//! channel failures are handed to an [`ErrorReporter`] once and returned to
//! the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dispatch_throttle::{DispatcherBuilder, LogChannel, RecipientKey, SmsMessage, SmsTemplate};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let dispatcher = DispatcherBuilder::new()
//!     .with_limit(5, Duration::from_secs(60))
//!     .build(LogChannel::new("dry-run"))
//!     .unwrap();
//!
//! let key = RecipientKey::new("+15550100").unwrap();
//! let message = SmsMessage::from(SmsTemplate::VerificationCode {
//!     code: "483920".to_string(),
//! });
//!
//! match dispatcher.dispatch(&key, &message).await {
//!     Ok(receipt) => println!("sent #{}", receipt.sequence),
//!     Err(err) => println!("not sent: {}", err),
//! }
//! # }
//! ```
//!
//! ## Semantics
//!
//! - An entry leaves the window once its age reaches `period`.
//! - A rejected attempt never reaches the channel and is not recorded.
//! - A failed send still consumes its slot; nothing is refunded.
//! - The dispatcher never retries. [`DispatchError::retry_after`] tells the
//!   caller how long until the recipient's oldest send expires.
//! - Admission for one recipient is atomic; recipients never block each
//!   other behind a global lock, and the channel is called without any
//!   limiter lock held.
//!
//! ## Errors
//!
//! ```rust
//! use dispatch_throttle::{DispatcherBuilder, ErrorKind, RecipientKey};
//! use dispatch_throttle::infrastructure::mocks::MockChannel;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dispatcher = DispatcherBuilder::new()
//!     .build(MockChannel::failing("gateway down"))
//!     .unwrap();
//! let key = RecipientKey::new("+15550100").unwrap();
//!
//! let err = dispatcher.dispatch(&key, &"hello".to_string()).await.unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ChannelFailure);
//! # }
//! ```
//!
//! ## Memory Management
//!
//! Each recipient that was ever sent to keeps a window until it is swept.
//! Windows whose entries have all expired can be removed:
//!
//! - explicitly, with [`RateLimiter::sweep`],
//! - on access, with [`SweepPolicy::EveryNAcquisitions`],
//! - periodically, with [`Dispatcher::spawn_sweeper`] (`async` feature).
//!
//! A sweep never removes a window that still holds a live entry.
//!
//! ## Observability
//!
//! Logging goes through `tracing`; the library never installs a subscriber.
//! [`TracingReporter`], the default reporter, emits failures as `ERROR`
//! events under the target `dispatch_throttle::report`. Outcome counters are
//! available through [`Dispatcher::metrics`]:
//!
//! ```rust,no_run
//! # use dispatch_throttle::{DispatcherBuilder, LogChannel};
//! # let dispatcher = DispatcherBuilder::new().build(LogChannel::new("dry-run")).unwrap();
//! let snapshot = dispatcher.metrics().snapshot();
//! println!("Rejection rate: {:.2}%", snapshot.rejection_rate() * 100.0);
//! ```
//!
//! ## Features
//!
//! - `async` (default): periodic [`Sweeper`] on Tokio
//! - `http`: `HttpSmsChannel` for Twilio-style SMS gateways
//! - `test-helpers`: test doubles in [`infrastructure::mocks`]

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    config::{ConfigError, RateLimitConfig, DEFAULT_LIMIT, DEFAULT_PERIOD},
    message::{AlertTemplate, Cents, SmsMessage, SmsTemplate, Summarize},
    outcome::{DispatchError, DispatchResult, ErrorKind, Outcome},
    recipient::{InvalidRecipient, RecipientKey, Redaction},
    report::FailureReport,
    window::{Admission, RateLimitWindow},
};

pub use application::{
    dispatcher::Dispatcher,
    limiter::{RateLimiter, SweepPolicy},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, DispatchChannel, ErrorReporter, Storage},
};

#[cfg(feature = "async")]
pub use application::sweeper::{ShutdownError, SweepConfig, SweepHandle, Sweeper};

pub use infrastructure::{
    builder::{BuildError, DispatcherBuilder, WindowStorage},
    clock::SystemClock,
    log_channel::{LogChannel, LogReceipt},
    reporter::{NoopReporter, TracingReporter},
    storage::ShardedStorage,
};

#[cfg(feature = "http")]
pub use infrastructure::http::{HttpChannelError, HttpSmsChannel, HttpSmsConfig, SmsReceipt};

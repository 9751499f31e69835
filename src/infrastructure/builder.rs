//! Dispatcher construction with production defaults.

use crate::application::{
    dispatcher::Dispatcher,
    limiter::{RateLimiter, SweepPolicy},
    metrics::Metrics,
    ports::{Clock, DispatchChannel, ErrorReporter},
};
use crate::domain::{
    config::{ConfigError, RateLimitConfig},
    recipient::{RecipientKey, Redaction},
    window::RateLimitWindow,
};
use crate::infrastructure::{clock::SystemClock, reporter::TracingReporter, storage::ShardedStorage};
use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Storage used by dispatchers built with [`DispatcherBuilder`].
pub type WindowStorage = Arc<ShardedStorage<RecipientKey, RateLimitWindow>>;

/// Error returned when building a [`Dispatcher`] fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// The rate-limit configuration is invalid
    #[error("invalid rate limit configuration: {0}")]
    Config(#[from] ConfigError),
    /// Access-triggered sweeping needs a positive interval
    #[error("sweep_every must be greater than 0")]
    ZeroSweepEvery,
}

/// Builder for a [`Dispatcher`] backed by in-memory sharded storage.
///
/// Defaults:
/// - Limit: 5 sends per recipient per 60 seconds
/// - Reporter: [`TracingReporter`]
/// - Clock: [`SystemClock`]
/// - Redaction: last 4 characters visible
/// - Sweep policy: [`SweepPolicy::Manual`]
///
/// # Example
///
/// ```
/// use dispatch_throttle::{DispatcherBuilder, LogChannel, RecipientKey, SmsMessage};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let dispatcher = DispatcherBuilder::new()
///     .with_limit(3, Duration::from_secs(60))
///     .build(LogChannel::new("dry-run"))
///     .unwrap();
///
/// let key = RecipientKey::new("+15550100").unwrap();
/// assert!(dispatcher.dispatch(&key, &SmsMessage::text("hi")).await.is_ok());
/// # }
/// ```
pub struct DispatcherBuilder {
    limit: usize,
    period: Duration,
    clock: Option<Arc<dyn Clock>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    redaction: Redaction,
    sweep_policy: SweepPolicy,
    sweep_every: Option<u64>,
    storage_capacity: Option<usize>,
}

impl DispatcherBuilder {
    /// Create a builder with the default settings.
    pub fn new() -> Self {
        let defaults = RateLimitConfig::default();
        Self {
            limit: defaults.limit(),
            period: defaults.period(),
            clock: None,
            reporter: None,
            redaction: Redaction::default(),
            sweep_policy: SweepPolicy::Manual,
            sweep_every: None,
            storage_capacity: None,
        }
    }

    /// Use an already validated rate-limit configuration.
    pub fn with_config(mut self, config: RateLimitConfig) -> Self {
        self.limit = config.limit();
        self.period = config.period();
        self
    }

    /// Allow at most `limit` sends per recipient in any trailing `period`.
    ///
    /// The values will be validated when `build()` is called.
    pub fn with_limit(mut self, limit: usize, period: Duration) -> Self {
        self.limit = limit;
        self.period = period;
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set where channel failures are reported.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Set how recipients appear in reports and logs.
    pub fn with_redaction(mut self, redaction: Redaction) -> Self {
        self.redaction = redaction;
        self
    }

    /// Set the sweep policy.
    pub fn with_sweep_policy(mut self, policy: SweepPolicy) -> Self {
        self.sweep_policy = policy;
        self.sweep_every = None;
        self
    }

    /// Sweep idle recipients after every `n`th admission check.
    ///
    /// The value will be validated when `build()` is called.
    pub fn with_sweep_every(mut self, n: u64) -> Self {
        self.sweep_every = Some(n);
        self
    }

    /// Pre-size window storage for `capacity` recipients.
    pub fn with_storage_capacity(mut self, capacity: usize) -> Self {
        self.storage_capacity = Some(capacity);
        self
    }

    /// Build a dispatcher sending through `channel`.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn build<C>(self, channel: C) -> Result<Dispatcher<C, WindowStorage>, BuildError>
    where
        C: DispatchChannel,
    {
        self.build_shared(Arc::new(channel))
    }

    /// Build a dispatcher sending through a shared `channel`.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn build_shared<C>(self, channel: Arc<C>) -> Result<Dispatcher<C, WindowStorage>, BuildError>
    where
        C: DispatchChannel,
    {
        let config = RateLimitConfig::new(self.limit, self.period)?;

        let sweep_policy = match self.sweep_every {
            Some(n) => SweepPolicy::EveryNAcquisitions(
                NonZeroU64::new(n).ok_or(BuildError::ZeroSweepEvery)?,
            ),
            None => self.sweep_policy,
        };

        let storage = match self.storage_capacity {
            Some(capacity) => ShardedStorage::with_capacity(capacity),
            None => ShardedStorage::new(),
        };

        let limiter = RateLimiter::new(Arc::new(storage), config, Metrics::new())
            .with_sweep_policy(sweep_policy);
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let reporter = self
            .reporter
            .unwrap_or_else(|| Arc::new(TracingReporter::new()));

        Ok(Dispatcher::new(
            limiter,
            channel,
            reporter,
            clock,
            self.redaction,
        ))
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Dispatch orchestration.
//!
//! A [`Dispatcher`] runs one logical send: it consults the rate limiter,
//! invokes the channel outside of any limiter lock, classifies the outcome and
//! reports channel failures. It never retries; retry policy belongs to the
//! caller.

use crate::application::limiter::RateLimiter;
use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, DispatchChannel, ErrorReporter, Storage};
use crate::domain::{
    message::Summarize,
    outcome::{DispatchError, DispatchResult, Outcome},
    recipient::{RecipientKey, Redaction},
    report::FailureReport,
    window::{Admission, RateLimitWindow},
};
use std::panic;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rate-limited front for a [`DispatchChannel`].
///
/// Cloning is cheap; clones share the limiter state, channel, reporter and
/// metrics.
pub struct Dispatcher<C, S>
where
    C: DispatchChannel,
    S: Storage<RecipientKey, RateLimitWindow> + Clone,
{
    limiter: RateLimiter<S>,
    channel: Arc<C>,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
    redaction: Redaction,
}

impl<C, S> Clone for Dispatcher<C, S>
where
    C: DispatchChannel,
    S: Storage<RecipientKey, RateLimitWindow> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            limiter: self.limiter.clone(),
            channel: Arc::clone(&self.channel),
            reporter: Arc::clone(&self.reporter),
            clock: Arc::clone(&self.clock),
            redaction: self.redaction,
        }
    }
}

impl<C, S> Dispatcher<C, S>
where
    C: DispatchChannel,
    S: Storage<RecipientKey, RateLimitWindow> + Clone,
{
    /// Create a new dispatcher.
    ///
    /// # Arguments
    /// * `limiter` - Per-recipient rate limiter (which contains the metrics)
    /// * `channel` - Outbound channel
    /// * `reporter` - Sink for failure reports
    /// * `clock` - Time source for admission checks
    /// * `redaction` - How recipients appear in reports and logs
    pub fn new(
        limiter: RateLimiter<S>,
        channel: Arc<C>,
        reporter: Arc<dyn ErrorReporter>,
        clock: Arc<dyn Clock>,
        redaction: Redaction,
    ) -> Self {
        Self {
            limiter,
            channel,
            reporter,
            clock,
            redaction,
        }
    }

    /// Send `payload` to `key` if the recipient's window has room.
    ///
    /// # Errors
    /// - [`DispatchError::RateLimitExceeded`] when the window is full; the
    ///   channel is not invoked.
    /// - [`DispatchError::ChannelFailure`] when the channel fails; the failure
    ///   has been reported once and the consumed slot is not refunded.
    pub async fn dispatch(
        &self,
        key: &RecipientKey,
        payload: &C::Payload,
    ) -> DispatchResult<C::Response, C::Error> {
        let now = self.clock.now();

        if let Admission::Rejected { retry_after } = self.limiter.check(key, now) {
            self.metrics().record(Outcome::RateLimited);
            warn!(
                recipient = %self.redaction.apply(key),
                retry_after_ms = retry_after.as_millis() as u64,
                outcome = %Outcome::RateLimited,
                "dispatch rejected by rate limit"
            );
            return Err(DispatchError::RateLimitExceeded { retry_after });
        }

        match self.channel.send(key, payload).await {
            Ok(response) => {
                self.metrics().record(Outcome::Succeeded);
                debug!(
                    recipient = %self.redaction.apply(key),
                    payload = %payload.summary(),
                    outcome = %Outcome::Succeeded,
                    "dispatch succeeded"
                );
                Ok(response)
            }
            Err(err) => {
                self.metrics().record(Outcome::Failed);
                let report =
                    FailureReport::new(self.redaction.apply(key), &err, payload.summary());
                self.report(&report);
                Err(DispatchError::ChannelFailure(err))
            }
        }
    }

    /// Hand a report to the reporter, containing any panic it raises.
    fn report(&self, report: &FailureReport) {
        let reporter = &self.reporter;
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| reporter.report(report)));
        if result.is_err() {
            warn!(
                recipient = %report.recipient,
                "error reporter panicked; failure report dropped"
            );
        }
    }

    /// Get a reference to the rate limiter.
    pub fn limiter(&self) -> &RateLimiter<S> {
        &self.limiter
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        self.limiter.metrics()
    }

    /// Get a reference to the channel.
    pub fn channel(&self) -> &Arc<C> {
        &self.channel
    }

    /// Get the redaction policy.
    pub fn redaction(&self) -> Redaction {
        self.redaction
    }

    /// Start a background task sweeping idle recipient windows every `interval`.
    ///
    /// **Requires the `async` feature** and a running Tokio runtime.
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroSweepInterval`](crate::ConfigError) if
    /// `interval` is zero.
    #[cfg(feature = "async")]
    pub fn spawn_sweeper(
        &self,
        interval: std::time::Duration,
    ) -> Result<crate::application::sweeper::SweepHandle, crate::domain::config::ConfigError>
    where
        S: 'static,
    {
        let config = crate::application::sweeper::SweepConfig::new(interval)?;
        let sweeper = crate::application::sweeper::Sweeper::new(
            self.limiter.clone(),
            Arc::clone(&self.clock),
            config,
        );
        Ok(sweeper.start())
    }
}

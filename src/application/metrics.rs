//! Observability metrics for dispatching.
//!
//! Provides counters of dispatch outcomes for monitoring and debugging.

use crate::domain::outcome::Outcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking dispatch statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Sends the channel accepted
    sends_succeeded: AtomicU64,
    /// Sends the channel failed
    sends_failed: AtomicU64,
    /// Attempts rejected by the limiter
    sends_rate_limited: AtomicU64,
    /// Recipient windows removed by sweeps
    keys_swept: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Record the terminal state of one attempt.
    pub(crate) fn record(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Succeeded => &self.inner.sends_succeeded,
            Outcome::Failed => &self.inner.sends_failed,
            Outcome::RateLimited => &self.inner.sends_rate_limited,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record removed recipient windows.
    pub(crate) fn record_swept(&self, count: usize) {
        self.inner
            .keys_swept
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get the number of sends the channel accepted.
    pub fn sends_succeeded(&self) -> u64 {
        self.inner.sends_succeeded.load(Ordering::Relaxed)
    }

    /// Get the number of sends the channel failed.
    pub fn sends_failed(&self) -> u64 {
        self.inner.sends_failed.load(Ordering::Relaxed)
    }

    /// Get the number of attempts rejected by the limiter.
    pub fn sends_rate_limited(&self) -> u64 {
        self.inner.sends_rate_limited.load(Ordering::Relaxed)
    }

    /// Get the number of recipient windows removed by sweeps.
    pub fn keys_swept(&self) -> u64 {
        self.inner.keys_swept.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sends_succeeded: self.sends_succeeded(),
            sends_failed: self.sends_failed(),
            sends_rate_limited: self.sends_rate_limited(),
            keys_swept: self.keys_swept(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.sends_succeeded.store(0, Ordering::Relaxed);
        self.inner.sends_failed.store(0, Ordering::Relaxed);
        self.inner.sends_rate_limited.store(0, Ordering::Relaxed);
        self.inner.keys_swept.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Sends the channel accepted
    pub sends_succeeded: u64,
    /// Sends the channel failed
    pub sends_failed: u64,
    /// Attempts rejected by the limiter
    pub sends_rate_limited: u64,
    /// Recipient windows removed by sweeps
    pub keys_swept: u64,
}

impl MetricsSnapshot {
    /// Total dispatch attempts, whatever their outcome.
    pub fn total_attempts(&self) -> u64 {
        self.sends_succeeded
            .saturating_add(self.sends_failed)
            .saturating_add(self.sends_rate_limited)
    }

    /// Fraction of attempts rejected by the limiter (0.0 to 1.0).
    ///
    /// Returns 0.0 if no attempts have been made.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_attempts();
        if total == 0 {
            0.0
        } else {
            self.sends_rate_limited as f64 / total as f64
        }
    }

    /// Fraction of channel invocations that failed (0.0 to 1.0).
    pub fn failure_rate(&self) -> f64 {
        let invoked = self.sends_succeeded.saturating_add(self.sends_failed);
        if invoked == 0 {
            0.0
        } else {
            self.sends_failed as f64 / invoked as f64
        }
    }
}

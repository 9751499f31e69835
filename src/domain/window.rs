//! Per-recipient sliding window of admitted sends.
//!
//! A [`RateLimitWindow`] holds the instants of prior admitted sends for one
//! recipient. Entries whose age has reached the configured period are pruned
//! lazily before every admission check, and a rejected attempt appends
//! nothing, so the window never holds more than `limit` entries.

use crate::domain::config::RateLimitConfig;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The send may proceed; its instant has been recorded.
    Admitted,
    /// The window is full.
    Rejected {
        /// Time until the oldest retained entry leaves the window.
        retry_after: Duration,
    },
}

impl Admission {
    /// Check if this decision is `Admitted`.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }

    /// Check if this decision is `Rejected`.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Admission::Rejected { .. })
    }

    /// Suggested wait before the next attempt, if rejected.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Admission::Admitted => None,
            Admission::Rejected { retry_after } => Some(*retry_after),
        }
    }
}

/// Ordered history of admitted send instants for one recipient.
///
/// # Example
/// ```
/// use dispatch_throttle::{RateLimitConfig, RateLimitWindow};
/// use std::time::{Duration, Instant};
///
/// let config = RateLimitConfig::new(2, Duration::from_secs(60)).unwrap();
/// let mut window = RateLimitWindow::new();
/// let now = Instant::now();
///
/// assert!(window.try_admit(now, &config).is_admitted());
/// assert!(window.try_admit(now, &config).is_admitted());
/// assert!(window.try_admit(now, &config).is_rejected());
///
/// // Once a full period has elapsed the slots free up again.
/// let later = now + Duration::from_secs(60);
/// assert!(window.try_admit(later, &config).is_admitted());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RateLimitWindow {
    admitted: VecDeque<Instant>,
}

impl RateLimitWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self {
            admitted: VecDeque::new(),
        }
    }

    /// Drop every entry whose age at `now` is at least `period`.
    ///
    /// Entries later than `now` (a clock that moved backward) have age zero
    /// and are kept.
    pub fn evict_expired(&mut self, now: Instant, period: Duration) {
        self.admitted
            .retain(|&at| now.saturating_duration_since(at) < period);
    }

    /// Prune expired entries, then admit and record `now` if under the limit.
    pub fn try_admit(&mut self, now: Instant, config: &RateLimitConfig) -> Admission {
        self.evict_expired(now, config.period());

        if self.admitted.len() < config.limit() {
            self.admitted.push_back(now);
            Admission::Admitted
        } else {
            Admission::Rejected {
                retry_after: self.retry_after(now, config.period()),
            }
        }
    }

    /// Number of entries still inside the window at `now`, without pruning.
    pub fn live_count(&self, now: Instant, period: Duration) -> usize {
        self.admitted
            .iter()
            .filter(|&&at| now.saturating_duration_since(at) < period)
            .count()
    }

    /// True when every entry has aged out at `now`.
    pub fn is_idle(&self, now: Instant, period: Duration) -> bool {
        self.live_count(now, period) == 0
    }

    /// Raw number of recorded entries, including any not yet pruned.
    pub fn len(&self) -> usize {
        self.admitted.len()
    }

    /// True when no entries are recorded.
    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty()
    }

    /// Time until the oldest live entry ages out.
    fn retry_after(&self, now: Instant, period: Duration) -> Duration {
        self.admitted
            .iter()
            .map(|&at| now.saturating_duration_since(at))
            .max()
            .map(|age| period.saturating_sub(age))
            .unwrap_or(Duration::ZERO)
    }
}

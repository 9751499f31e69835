//! Per-recipient sliding-window rate limiter.
//!
//! The limiter owns one [`RateLimitWindow`] per recipient key and decides
//! whether a new send is admissible. The decision and the window update run
//! under the storage's per-entry lock, so concurrent checks for the same key
//! are serialized while checks for different keys proceed independently.

use crate::application::metrics::Metrics;
use crate::application::ports::Storage;
use crate::domain::{
    config::RateLimitConfig,
    recipient::RecipientKey,
    window::{Admission, RateLimitWindow},
};
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// When idle recipient windows are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepPolicy {
    /// Only on explicit [`RateLimiter::sweep`] calls (or a periodic sweeper).
    #[default]
    Manual,
    /// Additionally sweep after every `n`th admission check.
    EveryNAcquisitions(NonZeroU64),
}

/// Coordinates admission decisions across recipients.
#[derive(Clone)]
pub struct RateLimiter<S>
where
    S: Storage<RecipientKey, RateLimitWindow> + Clone,
{
    storage: S,
    config: RateLimitConfig,
    sweep_policy: SweepPolicy,
    checks: Arc<AtomicU64>,
    metrics: Metrics,
}

impl<S> RateLimiter<S>
where
    S: Storage<RecipientKey, RateLimitWindow> + Clone,
{
    /// Create a new rate limiter with manual sweeping.
    ///
    /// # Arguments
    /// * `storage` - Per-recipient window storage
    /// * `config` - Validated sliding-window policy
    /// * `metrics` - Metrics tracker (sweeps are recorded here)
    pub fn new(storage: S, config: RateLimitConfig, metrics: Metrics) -> Self {
        Self {
            storage,
            config,
            sweep_policy: SweepPolicy::Manual,
            checks: Arc::new(AtomicU64::new(0)),
            metrics,
        }
    }

    /// Set the sweep policy.
    pub fn with_sweep_policy(mut self, policy: SweepPolicy) -> Self {
        self.sweep_policy = policy;
        self
    }

    /// Decide whether a send to `key` at `now` is admissible, recording it if so.
    ///
    /// Expired entries are pruned first. A rejection leaves the window
    /// unchanged apart from that pruning.
    pub fn check(&self, key: &RecipientKey, now: Instant) -> Admission {
        let admission = self.storage.with_entry_mut(
            key.clone(),
            RateLimitWindow::new,
            |window| window.try_admit(now, &self.config),
        );

        self.maybe_sweep(now);
        admission
    }

    /// Boolean form of [`RateLimiter::check`].
    pub fn try_acquire(&self, key: &RecipientKey, now: Instant) -> bool {
        self.check(key, now).is_admitted()
    }

    /// Number of admitted sends for `key` still inside the window at `now`.
    ///
    /// Read-only: never creates a window for an unknown key.
    pub fn usage(&self, key: &RecipientKey, now: Instant) -> usize {
        let period = self.config.period();
        self.storage
            .with_entry(key, |window| window.live_count(now, period))
            .unwrap_or(0)
    }

    /// Remove every recipient whose whole window has aged out at `now`.
    ///
    /// Returns the number of windows removed. A window holding any entry that
    /// is still live at `now` is kept.
    pub fn sweep(&self, now: Instant) -> usize {
        let period = self.config.period();
        let mut removed = 0;
        self.storage.retain(|_key, window| {
            if window.is_idle(now, period) {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.metrics.record_swept(removed);
            debug!(removed, remaining = self.storage.len(), "swept idle recipient windows");
        }
        removed
    }

    fn maybe_sweep(&self, now: Instant) {
        if let SweepPolicy::EveryNAcquisitions(every) = self.sweep_policy {
            let count = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
            if count % every.get() == 0 {
                self.sweep(now);
            }
        }
    }

    /// Number of recipients with a window in storage.
    pub fn tracked_keys(&self) -> usize {
        self.storage.len()
    }

    /// Drop every recipient window.
    pub fn clear(&self) {
        self.storage.clear();
    }

    /// Get the sliding-window policy.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Get the sweep policy.
    pub fn sweep_policy(&self) -> SweepPolicy {
        self.sweep_policy
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::ShardedStorage;
    use std::thread;
    use std::time::Duration;

    type Windows = Arc<ShardedStorage<RecipientKey, RateLimitWindow>>;

    fn limiter(limit: usize, period_secs: u64) -> RateLimiter<Windows> {
        let config = RateLimitConfig::new(limit, Duration::from_secs(period_secs)).unwrap();
        RateLimiter::new(Arc::new(ShardedStorage::new()), config, Metrics::new())
    }

    fn key(s: &str) -> RecipientKey {
        RecipientKey::new(s).unwrap()
    }

    #[test]
    fn test_rate_limiter_basic() {
        let limiter = limiter(2, 60);
        let now = Instant::now();
        let k = key("+1555");

        assert!(limiter.try_acquire(&k, now));
        assert!(limiter.try_acquire(&k, now));
        assert!(!limiter.try_acquire(&k, now));
        assert!(!limiter.try_acquire(&k, now));
        assert_eq!(limiter.usage(&k, now), 2);
    }

    #[test]
    fn test_window_slides() {
        let limiter = limiter(2, 60);
        let start = Instant::now();
        let k = key("+1555");

        assert!(limiter.try_acquire(&k, start));
        assert!(limiter.try_acquire(&k, start));
        assert!(!limiter.try_acquire(&k, start + Duration::from_secs(30)));
        assert!(limiter.try_acquire(&k, start + Duration::from_secs(60)));
    }

    #[test]
    fn test_check_reports_retry_after() {
        let limiter = limiter(1, 60);
        let start = Instant::now();
        let k = key("+1555");

        assert_eq!(limiter.check(&k, start), Admission::Admitted);
        assert_eq!(
            limiter.check(&k, start + Duration::from_secs(10)),
            Admission::Rejected {
                retry_after: Duration::from_secs(50)
            }
        );
    }

    #[test]
    fn test_different_keys_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        let a = key("+1555000");
        let b = key("+1555001");

        assert!(limiter.try_acquire(&a, now));
        assert!(limiter.try_acquire(&b, now));
        assert!(!limiter.try_acquire(&a, now));
        assert!(!limiter.try_acquire(&b, now));
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn test_usage_does_not_create_windows() {
        let limiter = limiter(1, 60);
        assert_eq!(limiter.usage(&key("nobody"), Instant::now()), 0);
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_sweep_removes_only_idle_windows() {
        let limiter = limiter(3, 60);
        let start = Instant::now();

        limiter.try_acquire(&key("old"), start);
        limiter.try_acquire(&key("recent"), start + Duration::from_secs(30));
        assert_eq!(limiter.tracked_keys(), 2);

        let removed = limiter.sweep(start + Duration::from_secs(60));
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_keys(), 1);
        assert_eq!(limiter.usage(&key("recent"), start + Duration::from_secs(60)), 1);
        assert_eq!(limiter.metrics().keys_swept(), 1);
    }

    #[test]
    fn test_sweep_keeps_window_with_future_entries() {
        let limiter = limiter(3, 60);
        let now = Instant::now();
        limiter.try_acquire(&key("k"), now + Duration::from_secs(120));

        // Sweeping with a stale instant must not drop a live window.
        assert_eq!(limiter.sweep(now), 0);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_access_triggered_sweep() {
        let limiter = limiter(1, 10).with_sweep_policy(SweepPolicy::EveryNAcquisitions(
            NonZeroU64::new(3).unwrap(),
        ));
        let start = Instant::now();

        limiter.try_acquire(&key("a"), start);
        limiter.try_acquire(&key("b"), start);
        assert_eq!(limiter.tracked_keys(), 2);

        // Third check happens after both windows aged out: they are swept,
        // while the window just created for "c" survives.
        limiter.try_acquire(&key("c"), start + Duration::from_secs(10));
        assert_eq!(limiter.tracked_keys(), 1);
        assert_eq!(limiter.usage(&key("c"), start + Duration::from_secs(10)), 1);
    }

    #[test]
    fn test_clear() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        for i in 0..10 {
            limiter.try_acquire(&key(&format!("+1555{}", i)), now);
        }
        assert_eq!(limiter.tracked_keys(), 10);

        limiter.clear();
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_concurrent_same_key_never_over_admits() {
        let limiter = Arc::new(limiter(50, 60));
        let now = Instant::now();
        let k = key("+1555");

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let k = k.clone();
                thread::spawn(move || {
                    (0..20).filter(|_| limiter.try_acquire(&k, now)).count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
        assert_eq!(limiter.usage(&k, now), 50);
    }

    #[test]
    fn test_concurrent_distinct_keys() {
        let limiter = Arc::new(limiter(5, 60));
        let now = Instant::now();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || {
                    let k = key(&format!("recipient-{}", i));
                    (0..20).filter(|_| limiter.try_acquire(&k, now)).count()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 5);
        }
        assert_eq!(limiter.tracked_keys(), 10);
    }
}

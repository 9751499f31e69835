//! Removal of idle recipient windows.

use dispatch_throttle::infrastructure::mocks::{MockChannel, MockClock};
use dispatch_throttle::{
    Clock, DispatcherBuilder, Metrics, RateLimitConfig, RateLimitWindow, RateLimiter,
    RecipientKey, ShardedStorage, SweepPolicy,
};
use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn key(s: &str) -> RecipientKey {
    RecipientKey::new(s).unwrap()
}

type Windows = Arc<ShardedStorage<RecipientKey, RateLimitWindow>>;

fn limiter(limit: usize, period_secs: u64) -> RateLimiter<Windows> {
    let config = RateLimitConfig::new(limit, Duration::from_secs(period_secs)).unwrap();
    RateLimiter::new(Arc::new(ShardedStorage::new()), config, Metrics::new())
}

#[test]
fn test_sweep_removes_only_idle_windows() {
    let limiter = limiter(3, 60);
    let start = Instant::now();

    limiter.try_acquire(&key("+1000"), start);
    limiter.try_acquire(&key("+2000"), start + Duration::from_secs(30));
    assert_eq!(limiter.tracked_keys(), 2);

    // Nothing has aged out yet
    assert_eq!(limiter.sweep(start + Duration::from_secs(59)), 0);

    // "+1000" is idle at t=60, "+2000" is still live
    assert_eq!(limiter.sweep(start + Duration::from_secs(60)), 1);
    assert_eq!(limiter.tracked_keys(), 1);
    assert_eq!(limiter.usage(&key("+2000"), start + Duration::from_secs(60)), 1);
    assert_eq!(limiter.metrics().keys_swept(), 1);
}

#[test]
fn test_sweep_never_resets_a_live_window() {
    let limiter = limiter(1, 60);
    let start = Instant::now();
    let k = key("+1000");

    assert!(limiter.try_acquire(&k, start));
    limiter.sweep(start + Duration::from_secs(10));

    // Still rejected after the sweep
    assert!(!limiter.try_acquire(&k, start + Duration::from_secs(10)));
}

#[test]
fn test_sweep_with_backward_clock_keeps_window() {
    let limiter = limiter(1, 60);
    let start = Instant::now() + Duration::from_secs(120);
    let k = key("+1000");

    assert!(limiter.try_acquire(&k, start));
    assert_eq!(limiter.sweep(start - Duration::from_secs(100)), 0);
    assert_eq!(limiter.tracked_keys(), 1);
}

#[test]
fn test_access_triggered_sweep() {
    let limiter = limiter(5, 60).with_sweep_policy(SweepPolicy::EveryNAcquisitions(
        NonZeroU64::new(3).unwrap(),
    ));
    let start = Instant::now();

    limiter.try_acquire(&key("+1000"), start);
    limiter.try_acquire(&key("+2000"), start);
    assert_eq!(limiter.tracked_keys(), 2);

    // Third check runs a sweep; both earlier windows have expired by then
    limiter.try_acquire(&key("+3000"), start + Duration::from_secs(61));
    assert_eq!(limiter.tracked_keys(), 1);
}

#[test]
fn test_manual_policy_never_sweeps_on_access() {
    let limiter = limiter(5, 60);
    let start = Instant::now();

    for i in 0..100 {
        limiter.try_acquire(&key(&format!("+{}", i)), start + Duration::from_secs(i * 61));
    }
    assert_eq!(limiter.tracked_keys(), 100);
}

#[cfg(feature = "async")]
#[tokio::test(start_paused = true)]
async fn test_dispatcher_periodic_sweeper() {
    let clock = Arc::new(MockClock::new(Instant::now()));
    let dispatcher = DispatcherBuilder::new()
        .with_limit(1, Duration::from_secs(60))
        .with_clock(clock.clone())
        .build(MockChannel::succeeding())
        .unwrap();

    for i in 0..10 {
        dispatcher
            .dispatch(&key(&format!("+1555000{}", i)), &"hi".to_string())
            .await
            .unwrap();
    }
    assert_eq!(dispatcher.limiter().tracked_keys(), 10);

    let handle = dispatcher.spawn_sweeper(Duration::from_millis(10)).unwrap();
    clock.advance(Duration::from_secs(60));
    // Paused time: step the runtime clock until the first tick has swept
    for _ in 0..50 {
        if dispatcher.limiter().tracked_keys() == 0 {
            break;
        }
        tokio::time::advance(Duration::from_millis(1)).await;
    }

    assert_eq!(dispatcher.limiter().tracked_keys(), 0);
    assert_eq!(dispatcher.metrics().keys_swept(), 10);
    handle.shutdown().await.unwrap();

    // Swept recipients start over with a fresh window
    assert!(dispatcher
        .dispatch(&key("+15550000"), &"hi".to_string())
        .await
        .is_ok());
    assert_eq!(dispatcher.limiter().usage(&key("+15550000"), clock.now()), 1);
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_spawn_sweeper_rejects_zero_interval() {
    let dispatcher = DispatcherBuilder::new()
        .build(MockChannel::succeeding())
        .unwrap();
    assert!(dispatcher.spawn_sweeper(Duration::ZERO).is_err());
}

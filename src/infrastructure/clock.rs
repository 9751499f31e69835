//! Clock adapters for time operations.
//!
//! Admission checks only ever compare instants from one monotonic source, so
//! production code uses [`SystemClock`]. Tests use `MockClock` from
//! `crate::infrastructure::mocks` (enabled by the `test-helpers` feature) to
//! move time forward without sleeping.

use crate::application::ports::Clock;
use std::time::Instant;

/// Monotonic system clock backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let readings: Vec<Instant> = (0..100).map(|_| clock.now()).collect();
        assert!(readings.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}

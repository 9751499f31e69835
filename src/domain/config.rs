//! Sliding-window rate limit configuration.
//!
//! A [`RateLimitConfig`] is the `(limit, period)` pair that governs every
//! recipient window. It can only be constructed in a valid state: a zero
//! limit or a non-positive period is rejected up front, never at call time.

use crate::domain::outcome::ErrorKind;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Default number of sends admitted per recipient per period.
pub const DEFAULT_LIMIT: usize = 5;

/// Default window length.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// Error returned when configuration validation fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The limit must admit at least one send per period.
    #[error("limit must be a positive integer")]
    ZeroLimit,
    /// The period must be positive and finite.
    #[error("period must be a positive, finite number of seconds (got {0})")]
    InvalidPeriod(f64),
    /// Sweep interval duration must be greater than zero.
    #[error("sweep interval must be greater than 0")]
    ZeroSweepInterval,
    /// A required environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

impl ConfigError {
    /// Classify this error within the dispatch error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

/// Validated sliding-window policy: at most `limit` sends per recipient within
/// any trailing `period`.
///
/// # Example
/// ```
/// use dispatch_throttle::RateLimitConfig;
/// use std::time::Duration;
///
/// let config = RateLimitConfig::new(5, Duration::from_secs(60)).unwrap();
/// assert_eq!(config.limit(), 5);
///
/// assert!(RateLimitConfig::new(0, Duration::from_secs(60)).is_err());
/// assert!(RateLimitConfig::from_secs_f64(5, -1.0).is_err());
/// ```
///
/// The configuration also deserializes from `{"limit": .., "period_seconds": ..}`,
/// running the same validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRateLimitConfig")]
pub struct RateLimitConfig {
    limit: usize,
    period: Duration,
}

impl RateLimitConfig {
    /// Create a configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroLimit`] if `limit` is zero and
    /// [`ConfigError::InvalidPeriod`] if `period` is zero.
    pub fn new(limit: usize, period: Duration) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if period.is_zero() {
            return Err(ConfigError::InvalidPeriod(0.0));
        }
        Ok(Self { limit, period })
    }

    /// Create a configuration from a period expressed in (possibly fractional) seconds.
    ///
    /// # Errors
    /// Same as [`RateLimitConfig::new`]; additionally rejects negative, NaN and
    /// infinite periods.
    pub fn from_secs_f64(limit: usize, period_seconds: f64) -> Result<Self, ConfigError> {
        if !period_seconds.is_finite() || period_seconds <= 0.0 {
            return Err(ConfigError::InvalidPeriod(period_seconds));
        }
        let period = Duration::try_from_secs_f64(period_seconds)
            .map_err(|_| ConfigError::InvalidPeriod(period_seconds))?;
        // Sub-nanosecond periods round down to zero
        if period.is_zero() {
            return Err(ConfigError::InvalidPeriod(period_seconds));
        }
        Self::new(limit, period)
    }

    /// Maximum admitted sends per recipient within one period.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Length of the sliding window.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            period: DEFAULT_PERIOD,
        }
    }
}

#[derive(Deserialize)]
struct RawRateLimitConfig {
    limit: usize,
    period_seconds: f64,
}

impl TryFrom<RawRateLimitConfig> for RateLimitConfig {
    type Error = ConfigError;

    fn try_from(raw: RawRateLimitConfig) -> Result<Self, Self::Error> {
        RateLimitConfig::from_secs_f64(raw.limit, raw.period_seconds)
    }
}

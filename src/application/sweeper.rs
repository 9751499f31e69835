//! Periodic sweeping of idle recipient windows.
//!
//! Recipients that stop receiving messages leave a window behind. The sweeper
//! removes windows whose entries have all aged out, on a fixed interval,
//! keeping memory bounded by the set of recently active recipients.

use crate::application::{limiter::RateLimiter, ports::{Clock, Storage}};
use crate::domain::{config::ConfigError, recipient::RecipientKey, window::RateLimitWindow};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::trace;

/// Configuration for periodic sweeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// How often to sweep
    pub interval: Duration,
}

impl SweepConfig {
    /// Create a sweep config with the specified interval.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroSweepInterval` if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(Self { interval })
    }
}

/// Error returned when the sweep task cannot be shut down cleanly.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// The task panicked or was cancelled before it could stop.
    #[error("sweep task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Runs [`RateLimiter::sweep`] on an interval.
pub struct Sweeper<S>
where
    S: Storage<RecipientKey, RateLimitWindow> + Clone,
{
    limiter: RateLimiter<S>,
    clock: Arc<dyn Clock>,
    config: SweepConfig,
}

impl<S> Sweeper<S>
where
    S: Storage<RecipientKey, RateLimitWindow> + Clone + 'static,
{
    /// Create a new sweeper.
    pub fn new(limiter: RateLimiter<S>, clock: Arc<dyn Clock>, config: SweepConfig) -> Self {
        Self {
            limiter,
            clock,
            config,
        }
    }

    /// Run one sweep now, returning the number of windows removed.
    pub fn sweep_once(&self) -> usize {
        self.limiter.sweep(self.clock.now())
    }

    /// Spawn the sweep loop on the current Tokio runtime.
    ///
    /// The first sweep runs one full interval after start. The task runs until
    /// [`SweepHandle::shutdown`] is called; dropping the handle detaches it.
    pub fn start(self) -> SweepHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let removed = self.sweep_once();
                        trace!(removed, "periodic sweep");
                    }
                }
            }
        });

        SweepHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    /// Get the sweep configuration.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }
}

/// Handle to a running sweep task.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Stop the sweep loop and wait for the task to finish.
    ///
    /// # Errors
    /// Returns [`ShutdownError::TaskFailed`] if the task panicked.
    pub async fn shutdown(mut self) -> Result<(), ShutdownError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The receiver is gone only if the task already ended.
            let _ = tx.send(());
        }
        self.task.await?;
        Ok(())
    }

    /// Check whether the sweep task has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

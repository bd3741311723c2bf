//! Background purging of expired seen-set entries.
//!
//! Expired entries are already invisible to lookups; the sweeper only
//! reclaims their memory. Without it, an expired entry stays allocated until
//! its key is seen again.

use crate::application::{
    metrics::Metrics,
    ports::{Clock, ExpiringSet},
};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "async")]
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

/// Error returned when sweeper configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SweeperConfigError {
    /// Sweep interval duration must be greater than zero
    #[error("sweep interval must be greater than 0")]
    ZeroInterval,
}

/// Error returned when stopping a running sweeper fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShutdownError {
    /// The sweep task panicked before it could be stopped
    #[error("expiry sweeper task panicked")]
    TaskPanicked,
    /// The sweep task was aborted before it could be stopped
    #[error("expiry sweeper task was cancelled")]
    Cancelled,
}

/// Configuration for periodic sweeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweeperConfig {
    /// How often to purge expired entries
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl SweeperConfig {
    /// Create a config with the given interval.
    ///
    /// # Errors
    /// Returns `SweeperConfigError::ZeroInterval` if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, SweeperConfigError> {
        if interval.is_zero() {
            return Err(SweeperConfigError::ZeroInterval);
        }
        Ok(Self { interval })
    }
}

/// Purges expired entries from a shared seen set.
pub struct ExpirySweeper<K, S> {
    seen: Arc<S>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
    config: SweeperConfig,
    _key: PhantomData<fn() -> K>,
}

impl<K, S> ExpirySweeper<K, S>
where
    K: Hash + Eq + Clone + Send + Sync,
    S: ExpiringSet<K>,
{
    /// Create a sweeper for `seen`.
    pub fn new(
        seen: Arc<S>,
        clock: Arc<dyn Clock>,
        metrics: Metrics,
        config: SweeperConfig,
    ) -> Self {
        Self {
            seen,
            clock,
            metrics,
            config,
            _key: PhantomData,
        }
    }

    /// Purge expired entries now.
    ///
    /// # Returns
    /// The number of entries removed.
    pub fn sweep_once(&self) -> usize {
        let purged = self.seen.purge_expired(self.clock.now());
        if purged > 0 {
            self.metrics.record_purged(purged);
            tracing::debug!(
                purged,
                remaining = self.seen.len(),
                "purged expired dedupe keys"
            );
        }
        purged
    }

    /// Get the sweeper configuration.
    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Start sweeping periodically on the current tokio runtime.
    ///
    /// The first sweep runs one interval after start. The task stops when
    /// [`SweeperHandle::shutdown`] is called or the handle is dropped.
    #[cfg(feature = "async")]
    pub fn start(self) -> SweeperHandle
    where
        K: 'static,
        S: 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let period = self.config.interval;

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        self.sweep_once();
                    }
                }
            }
            tracing::debug!("expiry sweeper stopped");
        });

        tracing::debug!(interval_ms = period.as_millis() as u64, "expiry sweeper started");
        SweeperHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }
}

/// Handle to a running sweeper task.
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

#[cfg(feature = "async")]
impl SweeperHandle {
    /// Stop the sweeper and wait for the task to finish.
    ///
    /// # Errors
    /// Returns `ShutdownError` if the task panicked or was aborted.
    pub async fn shutdown(mut self) -> Result<(), ShutdownError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The receiver is gone only if the task already ended
            let _ = tx.send(());
        }

        match (&mut self.task).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_panic() => Err(ShutdownError::TaskPanicked),
            Err(_) => Err(ShutdownError::Cancelled),
        }
    }

    /// Check if the sweep task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

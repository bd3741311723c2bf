//! Host pipeline adapter for the dedupe filter.
//!
//! `DedupeOperator` is what a pipeline embeds: it bundles the filter with
//! its configuration and, when a sweep interval is set, the background
//! sweeper. It implements [`FilterFunction`] so the host drives it through
//! `open` and `filter`.

use crate::application::filter::{DedupeFilter, FilterError};
use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, FilterFunction};
use crate::application::sweeper::{ExpirySweeper, SweeperConfig, SweeperConfigError};
use crate::domain::key::KeySelector;
use crate::domain::window::{ConfigError, ExpirationWindow};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::DedupeConfig;
use crate::infrastructure::storage::ShardedExpiringSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "async")]
use crate::application::sweeper::{ShutdownError, SweeperHandle};

/// Error returned when building a `DedupeOperator` fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// No expiration window was configured
    #[error("expiration window must be configured")]
    MissingExpiration,
    /// Expiration window validation failed
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Sweeper configuration validation failed
    #[error("sweeper configuration error: {0}")]
    Sweeper(#[from] SweeperConfigError),
}

/// Builder for constructing a `DedupeOperator`.
pub struct DedupeOperatorBuilder<T, K, KS> {
    key_selector: KS,
    expiration: Option<Duration>,
    sweep_interval: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<Metrics>,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T, K, KS> DedupeOperatorBuilder<T, K, KS>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    KS: KeySelector<T, K>,
{
    /// Set how long a key stays seen after first sighting.
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Set the expiration window in milliseconds.
    pub fn with_expiration_ms(self, millis: u64) -> Self {
        self.with_expiration(Duration::from_millis(millis))
    }

    /// Purge expired keys in the background at this interval.
    ///
    /// The sweeper runs only with the `async` feature and when `open` is
    /// called inside a tokio runtime. Otherwise expired keys are reclaimed
    /// lazily or through [`DedupeOperator::sweep_expired`].
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Set a custom clock for timestamping keys.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Report into an existing metrics tracker.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Apply expiration and sweep interval from a deserialized config.
    ///
    /// A config without `sweep_interval_ms` keeps any interval set earlier.
    /// Values are validated by [`build`](Self::build).
    pub fn with_config(mut self, config: &DedupeConfig) -> Self {
        self.expiration = Some(Duration::from_millis(config.expiration_ms));
        if let Some(millis) = config.sweep_interval_ms {
            self.sweep_interval = Some(Duration::from_millis(millis));
        }
        self
    }

    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn build(self) -> Result<DedupeOperator<T, K, KS>, BuildError> {
        let expiration = self.expiration.ok_or(BuildError::MissingExpiration)?;
        let window = ExpirationWindow::new(expiration)?;
        let sweeper_config = self.sweep_interval.map(SweeperConfig::new).transpose()?;

        let clock = self.clock.unwrap_or_else(SystemClock::shared);
        let metrics = self.metrics.unwrap_or_default();
        let filter = DedupeFilter::from_parts(self.key_selector, window, clock).with_metrics(metrics);

        Ok(DedupeOperator {
            filter,
            sweeper_config,
            #[cfg(feature = "async")]
            sweeper: None,
        })
    }
}

/// Dedupe filter packaged for a host pipeline.
///
/// # Example
/// ```
/// use stream_dedupe::{key_fn, DedupeOperator, FilterFunction};
/// use std::time::Duration;
///
/// let mut op = DedupeOperator::builder(key_fn(|id: &u64| *id))
///     .with_expiration(Duration::from_secs(30))
///     .build()
///     .unwrap();
///
/// op.open().unwrap();
/// assert!(op.filter(&1).unwrap());
/// assert!(!op.filter(&1).unwrap());
/// ```
pub struct DedupeOperator<T, K, KS> {
    filter: DedupeFilter<T, K, KS, ShardedExpiringSet<K>>,
    sweeper_config: Option<SweeperConfig>,
    #[cfg(feature = "async")]
    sweeper: Option<SweeperHandle>,
}

impl<T, K, KS> DedupeOperator<T, K, KS>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    KS: KeySelector<T, K>,
{
    /// Create a builder for configuring the operator.
    ///
    /// An expiration window must be set before `build`. Defaults:
    /// - Clock: system clock
    /// - Sweep interval: none (lazy reclamation only)
    pub fn builder(key_selector: KS) -> DedupeOperatorBuilder<T, K, KS> {
        DedupeOperatorBuilder {
            key_selector,
            expiration: None,
            sweep_interval: None,
            clock: None,
            metrics: None,
            _marker: PhantomData,
        }
    }

    /// Get the underlying filter.
    pub fn dedupe_filter(&self) -> &DedupeFilter<T, K, KS, ShardedExpiringSet<K>> {
        &self.filter
    }

    /// Get the expiration window.
    pub fn window(&self) -> ExpirationWindow {
        self.filter.window()
    }

    /// Get the configured sweep interval, if any.
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweeper_config.map(|config| config.interval)
    }

    /// Get current metrics.
    pub fn metrics(&self) -> &Metrics {
        self.filter.metrics()
    }

    /// Number of stored keys, including expired ones not yet purged.
    pub fn tracked_keys(&self) -> usize {
        self.filter.tracked_keys()
    }

    /// Purge expired keys now, on the calling thread.
    ///
    /// Returns 0 before `open`.
    pub fn sweep_expired(&self) -> usize {
        self.sweeper(self.sweeper_config.unwrap_or_default())
            .map_or(0, |sweeper| sweeper.sweep_once())
    }

    /// Sweeper over the seen set, once `open` has allocated it.
    fn sweeper(&self, config: SweeperConfig) -> Option<ExpirySweeper<K, ShardedExpiringSet<K>>> {
        let seen = self.filter.seen_set()?;
        Some(ExpirySweeper::new(
            Arc::clone(seen),
            Arc::clone(self.filter.clock()),
            self.filter.metrics().clone(),
            config,
        ))
    }

    /// Check if a background sweeper is running.
    pub fn is_sweeping(&self) -> bool {
        #[cfg(feature = "async")]
        {
            self.sweeper
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
        }
        #[cfg(not(feature = "async"))]
        {
            false
        }
    }
}

#[cfg(feature = "async")]
impl<T, K, KS> DedupeOperator<T, K, KS>
where
    K: Hash + Eq + Clone + Send + Sync + Debug + 'static,
    KS: KeySelector<T, K>,
{
    /// Stop the background sweeper, if running.
    ///
    /// **Requires the `async` feature.**
    ///
    /// # Errors
    /// Returns an error if the sweep task fails to shut down gracefully.
    pub async fn shutdown(&mut self) -> Result<(), ShutdownError> {
        match self.sweeper.take() {
            Some(handle) => handle.shutdown().await,
            None => Ok(()),
        }
    }

    fn start_sweeper(&mut self, config: SweeperConfig) {
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!("no tokio runtime available; expired dedupe keys are reclaimed lazily");
            return;
        }

        if let Some(sweeper) = self.sweeper(config) {
            self.sweeper = Some(sweeper.start());
        }
    }
}

#[cfg(feature = "async")]
impl<T, K, KS> FilterFunction<T> for DedupeOperator<T, K, KS>
where
    K: Hash + Eq + Clone + Send + Sync + Debug + 'static,
    KS: KeySelector<T, K>,
{
    fn open(&mut self) -> Result<(), FilterError> {
        self.filter.initialize()?;
        if let Some(config) = self.sweeper_config {
            self.start_sweeper(config);
        }
        Ok(())
    }

    fn filter(&self, element: &T) -> Result<bool, FilterError> {
        self.filter.evaluate(element)
    }
}

#[cfg(not(feature = "async"))]
impl<T, K, KS> FilterFunction<T> for DedupeOperator<T, K, KS>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    KS: KeySelector<T, K>,
{
    fn open(&mut self) -> Result<(), FilterError> {
        self.filter.initialize()?;
        if self.sweeper_config.is_some() {
            tracing::warn!("sweep interval ignored without the `async` feature");
        }
        Ok(())
    }

    fn filter(&self, element: &T) -> Result<bool, FilterError> {
        self.filter.evaluate(element)
    }
}

impl<T, K, KS> Debug for DedupeOperator<T, K, KS>
where
    K: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupeOperator")
            .field("filter", &self.filter)
            .field("sweeper_config", &self.sweeper_config)
            .finish_non_exhaustive()
    }
}

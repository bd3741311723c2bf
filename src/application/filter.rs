//! Dedupe filter coordination logic.
//!
//! The filter extracts a key from each element and admits the element only
//! if that key has not been seen within the expiration window.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, ExpiringSet, FilterFunction};
use crate::domain::{
    decision::Decision,
    key::{KeyExtractionError, KeySelector},
    window::{ConfigError, ExpirationWindow},
};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::storage::ShardedExpiringSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Error returned when an element cannot be evaluated.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The key selector failed for this element
    #[error(transparent)]
    KeyExtraction(#[from] KeyExtractionError),
    /// `evaluate` was called before `initialize`
    #[error("dedupe filter used before initialize()")]
    NotInitialized,
    /// `initialize` was called more than once
    #[error("dedupe filter already initialized")]
    AlreadyInitialized,
}

/// Time-windowed duplicate filter.
///
/// Holds the seen set for one pipeline instance. The set is allocated by
/// [`initialize`](Self::initialize), which the owning pipeline calls once
/// before the first element.
///
/// # Example
/// ```
/// use stream_dedupe::{key_fn, DedupeFilter};
/// use std::time::Duration;
///
/// let mut filter = DedupeFilter::new(key_fn(|s: &&str| s.to_string()), Duration::from_secs(60))
///     .unwrap();
/// filter.initialize().unwrap();
///
/// assert!(filter.evaluate(&"a").unwrap());
/// assert!(!filter.evaluate(&"a").unwrap());
/// assert!(filter.evaluate(&"b").unwrap());
/// ```
pub struct DedupeFilter<T, K, KS, S = ShardedExpiringSet<K>> {
    key_selector: KS,
    window: ExpirationWindow,
    clock: Arc<dyn Clock>,
    seen: Option<Arc<S>>,
    metrics: Metrics,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T, K, KS> DedupeFilter<T, K, KS, ShardedExpiringSet<K>>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    KS: KeySelector<T, K>,
{
    /// Create a filter backed by the system clock.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroExpiration` if `expiration` is zero.
    pub fn new(key_selector: KS, expiration: Duration) -> Result<Self, ConfigError> {
        Self::with_clock(key_selector, expiration, SystemClock::shared())
    }

    /// Create a filter backed by a custom clock.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroExpiration` if `expiration` is zero.
    pub fn with_clock(
        key_selector: KS,
        expiration: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let window = ExpirationWindow::new(expiration)?;
        Ok(Self::from_parts(key_selector, window, clock))
    }
}

impl<T, K, KS, S> DedupeFilter<T, K, KS, S>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    KS: KeySelector<T, K>,
    S: ExpiringSet<K>,
{
    /// Create a filter over any seen-set implementation.
    pub fn from_parts(key_selector: KS, window: ExpirationWindow, clock: Arc<dyn Clock>) -> Self {
        Self {
            key_selector,
            window,
            clock,
            seen: None,
            metrics: Metrics::new(),
            _marker: PhantomData,
        }
    }

    /// Report into an existing metrics tracker instead of a private one.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Allocate the seen set.
    ///
    /// # Errors
    /// Returns `FilterError::AlreadyInitialized` on a second call; the
    /// existing set is kept.
    pub fn initialize(&mut self) -> Result<(), FilterError> {
        if self.seen.is_some() {
            return Err(FilterError::AlreadyInitialized);
        }
        self.seen = Some(Arc::new(S::with_window(self.window)));
        tracing::debug!(
            expiration_ms = self.window.duration().as_millis() as u64,
            "dedupe filter initialized"
        );
        Ok(())
    }

    /// Decide whether `element` is the first of its key within the window.
    ///
    /// On admit the key is recorded with the current time. A duplicate does
    /// not refresh the stored time.
    ///
    /// # Errors
    /// - `FilterError::NotInitialized` before `initialize`
    /// - `FilterError::KeyExtraction` if no key can be derived; nothing is
    ///   recorded for the element
    pub fn decide(&self, element: &T) -> Result<Decision, FilterError> {
        let seen = self.seen.as_ref().ok_or(FilterError::NotInitialized)?;

        let key = match self.key_selector.select_key(element) {
            Ok(key) => key,
            Err(err) => {
                self.metrics.record_key_failure();
                tracing::warn!(error = %err, "dedupe key extraction failed");
                return Err(err.into());
            }
        };

        let now = self.clock.now();
        let decision = Decision::from_inserted(seen.insert_if_absent(key, now));

        match decision {
            Decision::Admit => self.metrics.record_admitted(),
            Decision::Reject => self.metrics.record_rejected(),
        }
        tracing::trace!(?decision, "dedupe decision");

        Ok(decision)
    }

    /// Admit (`true`) or reject (`false`) `element`.
    ///
    /// # Errors
    /// Same as [`decide`](Self::decide).
    pub fn evaluate(&self, element: &T) -> Result<bool, FilterError> {
        self.decide(element).map(Decision::is_admit)
    }

    /// Check if `initialize` has run.
    pub fn is_initialized(&self) -> bool {
        self.seen.is_some()
    }

    /// Number of stored keys, including expired ones not yet purged.
    pub fn tracked_keys(&self) -> usize {
        self.seen.as_ref().map_or(0, |seen| seen.len())
    }

    /// Shared handle to the seen set, once initialized.
    pub fn seen_set(&self) -> Option<&Arc<S>> {
        self.seen.as_ref()
    }

    /// Get the expiration window.
    pub fn window(&self) -> ExpirationWindow {
        self.window
    }

    /// Get the clock used to timestamp entries.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl<T, K, KS, S> FilterFunction<T> for DedupeFilter<T, K, KS, S>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    KS: KeySelector<T, K>,
    S: ExpiringSet<K>,
{
    fn open(&mut self) -> Result<(), FilterError> {
        self.initialize()
    }

    fn filter(&self, element: &T) -> Result<bool, FilterError> {
        self.evaluate(element)
    }
}

impl<T, K, KS, S> Debug for DedupeFilter<T, K, KS, S>
where
    S: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupeFilter")
            .field("window", &self.window)
            .field("clock", &self.clock)
            .field("seen", &self.seen)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

//! Observability metrics for deduplication.
//!
//! Counts admitted and rejected elements, key extraction failures, and
//! entries purged from the seen set.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking dedupe statistics.
///
/// All counters use relaxed atomics. Clones share the same counters, so a
/// clone handed to the sweeper reports into the same snapshot as the filter.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Elements whose key was absent or expired
    elements_admitted: AtomicU64,
    /// Elements whose key was present and fresh
    elements_rejected: AtomicU64,
    /// Elements for which no key could be derived
    key_failures: AtomicU64,
    /// Expired entries physically removed by sweeps
    entries_purged: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                elements_admitted: AtomicU64::new(0),
                elements_rejected: AtomicU64::new(0),
                key_failures: AtomicU64::new(0),
                entries_purged: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_admitted(&self) {
        self.inner.elements_admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.inner.elements_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_key_failure(&self) {
        self.inner.key_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_purged(&self, count: usize) {
        self.inner
            .entries_purged
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get the total number of elements admitted.
    pub fn elements_admitted(&self) -> u64 {
        self.inner.elements_admitted.load(Ordering::Relaxed)
    }

    /// Get the total number of elements rejected as duplicates.
    pub fn elements_rejected(&self) -> u64 {
        self.inner.elements_rejected.load(Ordering::Relaxed)
    }

    /// Get the total number of key extraction failures.
    pub fn key_failures(&self) -> u64 {
        self.inner.key_failures.load(Ordering::Relaxed)
    }

    /// Get the total number of expired entries purged.
    pub fn entries_purged(&self) -> u64 {
        self.inner.entries_purged.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            elements_admitted: self.elements_admitted(),
            elements_rejected: self.elements_rejected(),
            key_failures: self.key_failures(),
            entries_purged: self.entries_purged(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.elements_admitted.store(0, Ordering::Relaxed);
        self.inner.elements_rejected.store(0, Ordering::Relaxed);
        self.inner.key_failures.store(0, Ordering::Relaxed);
        self.inner.entries_purged.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total number of elements admitted
    pub elements_admitted: u64,
    /// Total number of elements rejected as duplicates
    pub elements_rejected: u64,
    /// Total number of key extraction failures
    pub key_failures: u64,
    /// Total number of expired entries purged
    pub entries_purged: u64,
}

impl MetricsSnapshot {
    /// Fraction of evaluated elements that were duplicates (0.0 to 1.0).
    ///
    /// Returns 0.0 if no elements have been evaluated.
    pub fn duplicate_rate(&self) -> f64 {
        let total = self.total_elements();
        if total == 0 {
            0.0
        } else {
            self.elements_rejected as f64 / total as f64
        }
    }

    /// Elements that reached a decision (admitted + rejected).
    pub fn total_elements(&self) -> u64 {
        self.elements_admitted.saturating_add(self.elements_rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initial_state() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot {
            elements_admitted: 0,
            elements_rejected: 0,
            key_failures: 0,
            entries_purged: 0,
        });
    }

    #[test]
    fn test_snapshot() {
        let metrics = Metrics::new();
        metrics.record_admitted();
        metrics.record_admitted();
        metrics.record_rejected();
        metrics.record_key_failure();
        metrics.record_purged(4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.elements_admitted, 2);
        assert_eq!(snapshot.elements_rejected, 1);
        assert_eq!(snapshot.key_failures, 1);
        assert_eq!(snapshot.entries_purged, 4);
        assert_eq!(snapshot.total_elements(), 3);
    }

    #[test]
    fn test_duplicate_rate_ignores_failures_and_purges() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot().duplicate_rate(), 0.0);

        // One distinct key seen four times, then reclaimed by a sweep
        metrics.record_admitted();
        for _ in 0..3 {
            metrics.record_rejected();
        }
        metrics.record_purged(1);
        metrics.record_key_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_elements(), 4);
        assert!((snapshot.duplicate_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_key_failures_not_counted_as_elements() {
        let metrics = Metrics::new();
        metrics.record_key_failure();
        metrics.record_key_failure();
        assert_eq!(metrics.snapshot().total_elements(), 0);
    }

    #[test]
    fn test_reset_clears_every_counter() {
        let metrics = Metrics::new();
        metrics.record_admitted();
        metrics.record_rejected();
        metrics.record_key_failure();
        metrics.record_purged(9);

        let observer = metrics.clone();
        metrics.reset();

        assert_eq!(observer.snapshot(), MetricsSnapshot::default());
        observer.record_purged(3);
        assert_eq!(metrics.entries_purged(), 3);
        assert_eq!(metrics.key_failures(), 0);
    }

    #[test]
    fn test_filter_and_sweeper_clones_report_together() {
        let filter_side = Metrics::new();
        let sweeper_side = filter_side.clone();

        filter_side.record_admitted();
        filter_side.record_key_failure();
        sweeper_side.record_purged(5);
        sweeper_side.record_purged(0);

        let snapshot = filter_side.snapshot();
        assert_eq!(snapshot.elements_admitted, 1);
        assert_eq!(snapshot.key_failures, 1);
        assert_eq!(snapshot.entries_purged, 5);
        assert_eq!(sweeper_side.snapshot(), snapshot);
    }

    #[test]
    fn test_concurrent_evaluation_and_sweeps() {
        use std::thread;

        let metrics = Metrics::new();

        // Evaluating threads admit one in four and fail one key in ten
        let evaluators: Vec<_> = (0..8)
            .map(|_| {
                let m = metrics.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        if i % 10 == 0 {
                            m.record_key_failure();
                        } else if i % 4 == 0 {
                            m.record_admitted();
                        } else {
                            m.record_rejected();
                        }
                    }
                })
            })
            .collect();

        let sweepers: Vec<_> = (0..2)
            .map(|_| {
                let m = metrics.clone();
                thread::spawn(move || {
                    for batch in 0..50 {
                        m.record_purged(batch % 3);
                    }
                })
            })
            .collect();

        for handle in evaluators.into_iter().chain(sweepers) {
            handle.join().unwrap();
        }

        // Per evaluator: 20 failures, 40 admits, 140 rejects
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.key_failures, 8 * 20);
        assert_eq!(snapshot.elements_admitted, 8 * 40);
        assert_eq!(snapshot.elements_rejected, 8 * 140);
        assert_eq!(snapshot.entries_purged, 2 * 49);
        assert_eq!(snapshot.total_elements(), 8 * 180);
    }
}

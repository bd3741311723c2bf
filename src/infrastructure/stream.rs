//! Iterator driver for filter operators.
//!
//! Stands in for a host pipeline: pulls elements one at a time, calls the
//! operator's lifecycle hook before the first one, and forwards admitted
//! elements.

use crate::application::filter::FilterError;
use crate::application::ports::FilterFunction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Pending,
    Open,
    Failed,
}

/// Iterator yielding the elements a [`FilterFunction`] admits.
///
/// Rejected elements are dropped. An element whose evaluation fails is
/// yielded as `Err` and the iterator keeps going, so the caller decides
/// whether one bad element ends the stream. If `open` fails, that error is
/// yielded once and the iterator ends.
#[derive(Debug)]
pub struct Deduplicated<I, F> {
    iter: I,
    operator: F,
    lifecycle: Lifecycle,
}

impl<I, F> Deduplicated<I, F> {
    /// Wrap `iter`, filtering through `operator`.
    ///
    /// `operator` must not have been opened yet.
    pub fn new(iter: I, operator: F) -> Self {
        Self {
            iter,
            operator,
            lifecycle: Lifecycle::Pending,
        }
    }

    /// Get the operator.
    pub fn operator(&self) -> &F {
        &self.operator
    }

    /// Release the operator, dropping any remaining elements.
    pub fn into_operator(self) -> F {
        self.operator
    }
}

impl<I, F> Iterator for Deduplicated<I, F>
where
    I: Iterator,
    F: FilterFunction<I::Item>,
{
    type Item = Result<I::Item, FilterError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lifecycle {
            Lifecycle::Failed => return None,
            Lifecycle::Pending => {
                if let Err(err) = self.operator.open() {
                    self.lifecycle = Lifecycle::Failed;
                    return Some(Err(err));
                }
                self.lifecycle = Lifecycle::Open;
            }
            Lifecycle::Open => {}
        }

        loop {
            let element = self.iter.next()?;
            match self.operator.filter(&element) {
                Ok(true) => return Some(Ok(element)),
                Ok(false) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.lifecycle {
            Lifecycle::Failed => (0, Some(0)),
            // An `open` failure is yielded as one extra item
            Lifecycle::Pending => (0, self.iter.size_hint().1.and_then(|n| n.checked_add(1))),
            Lifecycle::Open => (0, self.iter.size_hint().1),
        }
    }
}

/// Adds [`deduplicate`](DedupeIteratorExt::deduplicate) to every iterator.
pub trait DedupeIteratorExt: Iterator + Sized {
    /// Filter this iterator through `operator`.
    ///
    /// # Example
    /// ```
    /// use stream_dedupe::{key_fn, DedupeIteratorExt, DedupeOperator};
    /// use std::time::Duration;
    ///
    /// let op = DedupeOperator::builder(key_fn(|s: &&str| s.to_lowercase()))
    ///     .with_expiration(Duration::from_secs(60))
    ///     .build()
    ///     .unwrap();
    ///
    /// let unique: Vec<&str> = ["a", "A", "b", "a"]
    ///     .into_iter()
    ///     .deduplicate(op)
    ///     .collect::<Result<_, _>>()
    ///     .unwrap();
    /// assert_eq!(unique, ["a", "b"]);
    /// ```
    fn deduplicate<F>(self, operator: F) -> Deduplicated<Self, F>
    where
        F: FilterFunction<Self::Item>,
    {
        Deduplicated::new(self, operator)
    }
}

impl<I: Iterator> DedupeIteratorExt for I {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::filter::DedupeFilter;
    use crate::domain::key::{key_fn, try_key_fn, KeyExtractionError};
    use crate::infrastructure::mocks::MockClock;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn test_drops_duplicates_in_order() {
        let filter = DedupeFilter::new(key_fn(|n: &u32| n % 3), Duration::from_secs(1)).unwrap();
        let admitted: Vec<u32> = (0..10)
            .deduplicate(filter)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(admitted, vec![0, 1, 2]);
    }

    #[test]
    fn test_errors_are_yielded_and_stream_continues() {
        let filter = DedupeFilter::new(
            try_key_fn(|s: &&str| {
                s.parse::<u32>()
                    .map_err(|e| KeyExtractionError::with_source("not a number", e))
            }),
            Duration::from_secs(1),
        )
        .unwrap();

        let results: Vec<_> = ["1", "x", "1", "2"].into_iter().deduplicate(filter).collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), &"1");
        assert!(matches!(results[1], Err(FilterError::KeyExtraction(_))));
        assert_eq!(results[2].as_ref().unwrap(), &"2");
    }

    #[test]
    fn test_open_failure_ends_stream() {
        let mut filter =
            DedupeFilter::new(key_fn(|n: &u32| *n), Duration::from_secs(1)).unwrap();
        filter.initialize().unwrap();

        let mut stream = (0..5).deduplicate(&mut filter);
        assert!(matches!(
            stream.next(),
            Some(Err(FilterError::AlreadyInitialized))
        ));
        assert!(stream.next().is_none());
        assert_eq!(stream.size_hint(), (0, Some(0)));
    }

    #[test]
    fn test_size_hint_before_open() {
        let filter = DedupeFilter::new(key_fn(|n: &usize| *n), Duration::from_secs(1)).unwrap();
        let stream = (0..4usize).deduplicate(filter);
        assert_eq!(stream.size_hint(), (0, Some(5)));

        let filter = DedupeFilter::new(key_fn(|n: &usize| *n), Duration::from_secs(1)).unwrap();
        let unbounded = (0..usize::MAX).deduplicate(filter);
        assert_eq!(unbounded.size_hint(), (0, None));
    }

    #[test]
    fn test_size_hint_after_open() {
        let filter = DedupeFilter::new(key_fn(|n: &usize| *n), Duration::from_secs(1)).unwrap();
        let mut stream = (0..usize::MAX).deduplicate(filter);
        assert_eq!(stream.next().unwrap().unwrap(), 0);
        assert_eq!(stream.size_hint(), (0, Some(usize::MAX - 1)));
    }

    #[test]
    fn test_borrowed_operator_keeps_state() {
        let clock = MockClock::new(Instant::now());
        let mut filter = DedupeFilter::with_clock(
            key_fn(|n: &u32| *n),
            Duration::from_millis(100),
            Arc::new(clock.clone()),
        )
        .unwrap();

        let first: Vec<u32> = [1, 2, 1]
            .into_iter()
            .deduplicate(&mut filter)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(first, vec![1, 2]);

        // Filter is open now; continue evaluating directly
        clock.advance_millis(100);
        assert!(filter.evaluate(&1).unwrap());
        assert_eq!(filter.metrics().elements_rejected(), 1);
    }
}

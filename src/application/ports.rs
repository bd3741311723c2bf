//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::application::filter::FilterError;
use crate::domain::window::ExpirationWindow;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Port for obtaining current time.
///
/// This abstraction allows the application layer to work with time
/// without depending on system clock implementation details.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for a set of keys with write-time expiry.
///
/// Implementations must honor logical expiry: a key whose age has reached
/// the window duration is never reported as present, whether or not it has
/// been physically removed yet. Infrastructure provides `ShardedExpiringSet`.
pub trait ExpiringSet<K>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
{
    /// Create an empty set whose entries expire after `window`.
    fn with_window(window: ExpirationWindow) -> Self
    where
        Self: Sized;

    /// Record `key` as seen at `now` unless a fresh entry already exists.
    ///
    /// The check and the insert happen atomically with respect to other
    /// callers using the same key. An expired entry is replaced and its
    /// insertion time reset to `now`. A fresh entry is left untouched.
    ///
    /// # Returns
    /// `true` if the key was recorded, `false` if it was already present.
    fn insert_if_absent(&self, key: K, now: Instant) -> bool;

    /// Check if a fresh entry exists for `key` at `now`.
    fn contains(&self, key: &K, now: Instant) -> bool;

    /// Physically remove every entry that has expired by `now`.
    ///
    /// # Returns
    /// The number of entries removed.
    fn purge_expired(&self, now: Instant) -> usize;

    /// Number of stored entries, including expired ones not yet purged.
    fn len(&self) -> usize;

    /// Check if no entries are stored.
    fn is_empty(&self) -> bool;

    /// Remove all entries.
    fn clear(&self);
}

/// Port modelling a host pipeline's filter operator.
///
/// The host calls `open` exactly once before delivering the first element,
/// then `filter` for each element, forwarding those that return `true`.
pub trait FilterFunction<T> {
    /// Lifecycle hook invoked once before the first element.
    ///
    /// # Errors
    /// Returns `FilterError` if the operator cannot be initialized.
    fn open(&mut self) -> Result<(), FilterError>;

    /// Decide whether `element` continues downstream.
    ///
    /// # Errors
    /// Returns `FilterError` if the element cannot be evaluated.
    fn filter(&self, element: &T) -> Result<bool, FilterError>;
}

impl<T, F> FilterFunction<T> for &mut F
where
    F: FilterFunction<T> + ?Sized,
{
    fn open(&mut self) -> Result<(), FilterError> {
        (**self).open()
    }

    fn filter(&self, element: &T) -> Result<bool, FilterError> {
        (**self).filter(element)
    }
}

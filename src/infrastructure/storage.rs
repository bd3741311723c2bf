//! Seen-set implementations.
//!
//! Provides a concurrent, sharded set of keys with write-time expiry.

use crate::application::ports::ExpiringSet;
use crate::domain::window::ExpirationWindow;
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Thread-safe sharded seen set backed by DashMap.
///
/// Each key maps to the instant it was recorded. Expired entries are
/// replaced in place when their key is seen again, and can be removed in
/// bulk with [`purge_expired`](ExpiringSet::purge_expired).
///
/// The entry API holds the shard lock across the freshness check and the
/// insert, so concurrent callers racing on the same key see exactly one
/// successful insert.
pub struct ShardedExpiringSet<K> {
    map: DashMap<K, Instant, RandomState>,
    window: ExpirationWindow,
}

impl<K> ShardedExpiringSet<K>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty set.
    pub fn new(window: ExpirationWindow) -> Self {
        Self {
            map: DashMap::with_hasher(RandomState::new()),
            window,
        }
    }

    /// Create an empty set with room for `capacity` keys.
    pub fn with_capacity(window: ExpirationWindow, capacity: usize) -> Self {
        Self {
            map: DashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            window,
        }
    }

    /// Get the expiration window.
    pub fn window(&self) -> ExpirationWindow {
        self.window
    }

    /// Instant at which `key` was recorded, if an entry is stored.
    ///
    /// The entry may already be expired.
    pub fn inserted_at(&self, key: &K) -> Option<Instant> {
        self.map.get(key).map(|entry| *entry.value())
    }
}

// DashMap is only Debug for hashable keys; keep this impl bound-free
impl<K> Debug for ShardedExpiringSet<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedExpiringSet")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl<K> ExpiringSet<K> for ShardedExpiringSet<K>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
{
    fn with_window(window: ExpirationWindow) -> Self {
        Self::new(window)
    }

    fn insert_if_absent(&self, key: K, now: Instant) -> bool {
        match self.map.entry(key) {
            Entry::Occupied(mut occupied) => {
                if self.window.is_expired(*occupied.get(), now) {
                    occupied.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                true
            }
        }
    }

    fn contains(&self, key: &K, now: Instant) -> bool {
        self.map
            .get(key)
            .is_some_and(|entry| !self.window.is_expired(*entry.value(), now))
    }

    fn purge_expired(&self, now: Instant) -> usize {
        let window = self.window;
        let mut purged = 0;
        self.map.retain(|_, inserted| {
            let expired = window.is_expired(*inserted, now);
            purged += usize::from(expired);
            !expired
        });
        purged
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn clear(&self) {
        self.map.clear();
    }
}

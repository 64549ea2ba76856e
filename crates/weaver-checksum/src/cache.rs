//! Bounded memo of previously computed checksums.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::Checksum;

/// Least-recently-used memo from caller keys to checksums.
///
/// Callers key the cache by whatever identifies the fingerprinted value in
/// their own model (a document version, a project identifier, a symbol key).
/// The cache is shared behind a mutex. Checksums are computed outside the lock,
/// so two racing callers may both compute a missing entry; since construction
/// is pure, both observe the same value.
#[derive(Debug)]
pub struct ChecksumCache<K: Hash + Eq> {
    entries: Mutex<LruCache<K, Checksum>>,
}

impl<K: Hash + Eq> ChecksumCache<K> {
    /// Creates an empty cache retaining at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the memoised checksum for `key`, marking it recently used.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Checksum> {
        self.lock().get(key).copied()
    }

    /// Returns the memoised checksum for `key`, computing and storing it with
    /// `create` when absent.
    pub fn get_or_create<F>(&self, key: K, create: F) -> Checksum
    where
        F: FnOnce() -> Checksum,
    {
        if let Some(checksum) = self.get(&key) {
            return checksum;
        }
        let checksum = create();
        self.insert(key, checksum);
        checksum
    }

    /// Stores `checksum` under `key`, returning the value it replaced.
    pub fn insert(&self, key: K, checksum: Checksum) -> Option<Checksum> {
        let mut entries = self.lock();
        let replaced = entries.peek(&key).copied();
        if entries.push(key, checksum).is_some() && replaced.is_none() {
            tracing::trace!(
                target: "weaver_checksum::cache",
                capacity = entries.cap().get(),
                "evicted least recently used checksum"
            );
        }
        replaced
    }

    /// Drops the entry for `key`, returning it when present.
    pub fn remove(&self, key: &K) -> Option<Checksum> {
        self.lock().pop(key)
    }

    /// Number of memoised entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when nothing is memoised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.lock().cap()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, Checksum>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Bounded pool of reusable XXH3 hashing states.
//!
//! Streaming states carry a sizeable internal buffer, so the engine recycles
//! them instead of allocating one per call. The pool never blocks callers on
//! exhaustion and never fails: when no idle state is available, or the pool's
//! lock is poisoned, a fresh state is allocated instead.

use std::sync::Mutex;

use once_cell::sync::Lazy;
use xxhash_rust::xxh3::Xxh3;

/// Maximum number of idle states retained between calls.
pub(crate) const POOL_CAPACITY: usize = 20;

static SHARED: Lazy<HasherPool> = Lazy::new(|| HasherPool::new(POOL_CAPACITY));

/// Returns the process-wide pool used by the checksum engine.
pub(crate) fn shared() -> &'static HasherPool {
    &SHARED
}

pub(crate) struct HasherPool {
    idle: Mutex<Vec<Box<Xxh3>>>,
    capacity: usize,
}

impl HasherPool {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Lends a reset state to `work` and reclaims it afterwards.
    ///
    /// A state lent to a closure that panics is dropped rather than returned.
    pub(crate) fn with_hasher<R>(&self, work: impl FnOnce(&mut Xxh3) -> R) -> R {
        let mut hasher = self.acquire();
        let result = work(&mut hasher);
        self.release(hasher);
        result
    }

    fn acquire(&self) -> Box<Xxh3> {
        self.idle
            .lock()
            .ok()
            .and_then(|mut idle| idle.pop())
            .unwrap_or_else(|| Box::new(Xxh3::new()))
    }

    fn release(&self, mut hasher: Box<Xxh3>) {
        hasher.reset();
        if let Ok(mut idle) = self.idle.lock()
            && idle.len() < self.capacity
        {
            idle.push(hasher);
        }
    }

    #[cfg(test)]
    pub(crate) fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or_default()
    }
}

//! In-process (L1) store: bounded LRU map with per-entry TTL.

use crate::codec::CachedValue;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// One L1 entry. Expiry is a pure function of `now` vs `expires_at`.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: CachedValue,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(value: CachedValue, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Mutex-guarded LRU map. All operations are O(1) map work under the lock;
/// callers must not hold anything across it (the methods are synchronous and
/// release the lock before returning).
pub struct LocalStore {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl LocalStore {
    pub fn new(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the map itself is still structurally valid.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Lookup; refreshes recency on hit. An expired entry is removed and
    /// reported as a miss.
    pub fn get(&self, key: &str) -> Option<CachedValue> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }
        entries.pop(key);
        None
    }

    /// Insert or replace. Returns `true` when an unrelated entry was evicted
    /// to make room.
    pub fn set(&self, key: &str, value: CachedValue, ttl: Duration) -> bool {
        let mut entries = self.lock();
        let evicted = entries.push(key.to_string(), CacheEntry::new(value, ttl));
        matches!(evicted, Some((ref old_key, _)) if old_key != key)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.lock().pop(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

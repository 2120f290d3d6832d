//! Cache engine: read-through / write-through orchestration over L1 + L2.
//!
//! One engine instance owns one namespace prefix, one [`LocalStore`] and an
//! optional handle to the shared [`DistributedStore`]. Consumers hand it local
//! keys; the engine namespaces them, keeps the two layers in sync on writes,
//! warms L1 from L2 hits on reads, and records statistics. Any distributed
//! failure degrades to a miss or no-op; nothing propagates to the caller.

use crate::codec::{CachedValue, ValueCodec};
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::stats::{AtomicStats, CacheStats};
use crate::store::{DistributedStore, LocalStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct CacheEngine {
    prefix: String,
    config: CacheConfig,
    local: LocalStore,
    remote: Option<Arc<dyn DistributedStore>>,
    codec: ValueCodec,
    stats: AtomicStats,
}

impl CacheEngine {
    /// L1-only engine.
    pub fn new(prefix: impl Into<String>, config: CacheConfig) -> Self {
        Self {
            prefix: prefix.into(),
            local: LocalStore::new(config.local_max_entries),
            config,
            remote: None,
            codec: ValueCodec::with_defaults(),
            stats: AtomicStats::new(),
        }
    }

    /// Engine backed by both layers. The store handle is typically shared
    /// with the other engines of the process.
    pub fn with_remote(
        prefix: impl Into<String>,
        config: CacheConfig,
        remote: Arc<dyn DistributedStore>,
    ) -> Self {
        let mut engine = Self::new(prefix, config);
        engine.remote = Some(remote);
        engine
    }

    /// Replace the codec, e.g. to register additional transportable types.
    pub fn with_codec(mut self, codec: ValueCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Layered lookup: L1 first, then L2 with L1 population on hit.
    ///
    /// The L1 lock is released before any network I/O and re-taken briefly to
    /// populate; a concurrent writer may interleave, which is the accepted
    /// eventual-consistency window.
    pub async fn get(&self, key: &str) -> Option<CachedValue> {
        let full_key = self.full_key(key);

        if let Some(value) = self.local.get(&full_key) {
            self.stats.l1_hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %full_key, "cache hit (L1)");
            return Some(value);
        }

        let Some(remote) = &self.remote else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        match remote.get(&full_key).await {
            Ok(Some(text)) => {
                let value = self.codec.decode(&text);
                if self.local.set(&full_key, value.clone(), self.config.local_ttl) {
                    self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                }
                self.stats.l2_hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %full_key, "cache hit (L2), populated L1");
                Some(value)
            }
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %full_key, "cache miss");
                None
            }
            Err(CacheError::Disabled) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full_key, error = %e, "distributed get failed, treating as miss");
                None
            }
        }
    }

    /// Write-through to both layers.
    ///
    /// The value is encoded once, up front: the encoded size drives admission
    /// control and the same text is what travels to L2. L1 takes the default
    /// or overridden TTL; L2 always uses its own, typically longer, TTL. An L2
    /// failure is logged and counted but never rolls back the L1 write.
    pub async fn set(&self, key: &str, value: CachedValue, ttl: Option<Duration>) {
        let full_key = self.full_key(key);

        let encoded = match self.codec.encode(&value) {
            Ok(text) => text,
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full_key, error = %e, "value failed to encode, caching skipped");
                return;
            }
        };

        let limit = self.config.max_response_bytes;
        if limit > 0 && encoded.len() > limit {
            self.stats.size_rejections.fetch_add(1, Ordering::Relaxed);
            warn!(
                key = %full_key,
                size = encoded.len(),
                limit,
                "value exceeds maximum cacheable size, caching skipped"
            );
            return;
        }

        let kind = value.kind();
        let local_ttl = ttl.unwrap_or(self.config.local_ttl);
        if self.local.set(&full_key, value, local_ttl) {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.writes.fetch_add(1, Ordering::Relaxed);
        debug!(key = %full_key, kind, "cache set");

        if let Some(remote) = &self.remote {
            match remote.set(&full_key, &encoded, self.config.remote_ttl).await {
                Ok(()) | Err(CacheError::Disabled) => {}
                Err(e) => {
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(key = %full_key, error = %e, "distributed set failed, L1 write kept");
                }
            }
        }
    }

    /// Remove a key from both layers; best-effort on L2.
    pub async fn delete(&self, key: &str) {
        let full_key = self.full_key(key);
        self.local.delete(&full_key);
        if let Some(remote) = &self.remote {
            match remote.delete(&full_key).await {
                Ok(()) | Err(CacheError::Disabled) => {}
                Err(e) => {
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(key = %full_key, error = %e, "distributed delete failed");
                }
            }
        }
    }

    /// Clear this engine's namespace: all of L1, and only `{prefix}:*` on L2.
    pub async fn clear(&self) {
        self.local.clear();
        if let Some(remote) = &self.remote {
            match remote.clear_prefix(&self.prefix).await {
                Ok(_) | Err(CacheError::Disabled) => {}
                Err(e) => {
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(prefix = %self.prefix, error = %e, "distributed clear failed");
                }
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Number of live L1 entries, for observability endpoints.
    pub fn local_len(&self) -> usize {
        self.local.len()
    }
}

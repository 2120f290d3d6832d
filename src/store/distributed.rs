//! Distributed (L2) store: networked key/value layer shared across processes.

use crate::error::CacheError;
use crate::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Contract for the distributed layer.
///
/// Keys arrive fully namespaced (`{prefix}:{localKey}`); `clear_prefix` must
/// only touch keys under the given prefix, never flush globally. Implementors
/// report failures as errors and leave degradation policy to the engine.
#[async_trait]
pub trait DistributedStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    /// Remove every key under `{prefix}:`. Returns the number removed.
    async fn clear_prefix(&self, prefix: &str) -> Result<u64>;
    fn name(&self) -> &'static str;
    /// Release pooled resources. Called once at registry shutdown.
    fn close(&self) {}
}

/// Redis-backed store over a shared connection pool.
///
/// The pool connects lazily on first use. A connection-level failure marks
/// this store disabled for the rest of the process so an outage cannot turn
/// into a reconnect storm; operation-level failures are reported per call and
/// do not disable the store.
pub struct RedisStore {
    pool: deadpool_redis::Pool,
    connect_timeout: Duration,
    operation_timeout: Duration,
    disabled: AtomicBool,
}

impl RedisStore {
    /// Build a store from a connection URL. Creating the pool performs no
    /// network I/O; the first operation does.
    pub fn connect(
        url: &str,
        connect_timeout: Duration,
        operation_timeout: Duration,
    ) -> Result<Self> {
        let cfg = deadpool_redis::Config::from_url(url);
        let pool = cfg
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(Self::from_pool(pool, connect_timeout, operation_timeout))
    }

    /// Build a store around an existing pool, e.g. one shared with other
    /// subsystems of the host process.
    pub fn from_pool(
        pool: deadpool_redis::Pool,
        connect_timeout: Duration,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            connect_timeout,
            operation_timeout,
            disabled: AtomicBool::new(false),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    fn disable(&self, reason: &str) {
        if !self.disabled.swap(true, Ordering::Relaxed) {
            warn!(reason = %reason, "distributed store unreachable, disabling for this process");
        }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection> {
        if self.is_disabled() {
            return Err(CacheError::Disabled);
        }
        match tokio::time::timeout(self.connect_timeout, self.pool.get()).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => {
                let msg = e.to_string();
                self.disable(&msg);
                Err(CacheError::Connection(msg))
            }
            Err(_) => {
                self.disable("connection attempt timed out");
                Err(CacheError::Timeout(self.connect_timeout))
            }
        }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = redis::RedisResult<T>>) -> Result<T> {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(CacheError::Backend(e.to_string())),
            Err(_) => Err(CacheError::Timeout(self.operation_timeout)),
        }
    }
}

#[async_trait]
impl DistributedStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn().await?;
        self.bounded(conn.get::<_, Option<String>>(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn().await?;
        self.bounded(conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)))
            .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        self.bounded(conn.del::<_, ()>(key)).await
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        let pattern = format!("{prefix}:*");
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = self
                .bounded(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(100)
                        .query_async(&mut conn),
                )
                .await?;
            if !keys.is_empty() {
                removed += keys.len() as u64;
                self.bounded(conn.del::<_, ()>(keys)).await?;
            }
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        debug!(prefix = %prefix, removed, "cleared distributed namespace");
        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "redis"
    }

    fn close(&self) {
        self.pool.close();
    }
}

/// Process-local stand-in for the distributed layer.
///
/// Useful when no distributed store is deployed and in tests; it honors the
/// same contract (TTL, prefix-scoped clear) without any network.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (String, Instant)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DistributedStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some((_, expires_at)) if Instant::now() >= *expires_at => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.lock()
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<u64> {
        let scoped = format!("{prefix}:");
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(&scoped));
        Ok((before - entries.len()) as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

//! Cache configuration.
//!
//! Defaults are conservative enough for a single-process deployment; the
//! distributed layer is opt-in. Every field has a builder method and an
//! `AI_CACHE_*` environment variable read by [`CacheConfig::from_env`].

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries held in the in-process (L1) store.
    pub local_max_entries: usize,
    /// TTL applied to L1 entries, including entries populated from L2 hits.
    pub local_ttl: Duration,
    /// TTL applied to entries written to the distributed (L2) store.
    /// Typically longer than `local_ttl` so restarted processes warm up from it.
    pub remote_ttl: Duration,
    /// Whether the distributed layer is used at all.
    pub remote_enabled: bool,
    /// Maximum encoded size accepted for caching; 0 disables the check.
    pub max_response_bytes: usize,
    /// Connection URL for the distributed store.
    pub redis_url: String,
    /// Timeout for acquiring a pooled connection.
    pub connect_timeout: Duration,
    /// Timeout for a single network operation against the distributed store.
    pub operation_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            local_max_entries: 1000,
            local_ttl: Duration::from_secs(300),
            remote_ttl: Duration::from_secs(3600),
            remote_enabled: false,
            max_response_bytes: 1024 * 1024,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(2),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local_max_entries(mut self, max: usize) -> Self {
        self.local_max_entries = max;
        self
    }

    pub fn with_local_ttl(mut self, ttl: Duration) -> Self {
        self.local_ttl = ttl;
        self
    }

    pub fn with_remote_ttl(mut self, ttl: Duration) -> Self {
        self.remote_ttl = ttl;
        self
    }

    pub fn with_remote_enabled(mut self, enabled: bool) -> Self {
        self.remote_enabled = enabled;
        self
    }

    pub fn with_max_response_bytes(mut self, max: usize) -> Self {
        self.max_response_bytes = max;
        self
    }

    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = url.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Build a configuration from `AI_CACHE_*` environment variables.
    ///
    /// Unset variables keep their defaults. Malformed values are logged at
    /// warning level and ignored rather than failing startup.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(v) = read_env_parsed("AI_CACHE_LOCAL_MAX_ENTRIES") {
            cfg.local_max_entries = v;
        }
        if let Some(secs) = read_env_parsed("AI_CACHE_LOCAL_TTL_SECS") {
            cfg.local_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env_parsed("AI_CACHE_REMOTE_TTL_SECS") {
            cfg.remote_ttl = Duration::from_secs(secs);
        }
        if let Ok(v) = std::env::var("AI_CACHE_REMOTE_ENABLED") {
            cfg.remote_enabled = matches!(v.trim(), "1" | "true" | "yes" | "on");
        }
        if let Some(v) = read_env_parsed("AI_CACHE_MAX_RESPONSE_BYTES") {
            cfg.max_response_bytes = v;
        }
        if let Ok(url) = std::env::var("AI_CACHE_REDIS_URL") {
            if !url.trim().is_empty() {
                cfg.redis_url = url;
            }
        }
        if let Some(secs) = read_env_parsed("AI_CACHE_CONNECT_TIMEOUT_SECS") {
            cfg.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env_parsed("AI_CACHE_OPERATION_TIMEOUT_SECS") {
            cfg.operation_timeout = Duration::from_secs(secs);
        }
        cfg
    }
}

fn read_env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(var = name, value = %raw, "ignoring malformed environment value");
                None
            }
        },
        Err(_) => None,
    }
}

//! Cache registry: explicit, startup-constructed composition root.
//!
//! The host process builds one registry when it boots, hands the consumer
//! wrappers to whoever needs them, and calls [`CacheRegistry::close`] at
//! shutdown. Engines are memoized per namespace prefix and all share one
//! distributed-store handle, so independent L1 maps converge through the same
//! L2. There is no lazy global state.

use crate::config::CacheConfig;
use crate::conversation::ConversationCache;
use crate::engine::CacheEngine;
use crate::prompt::PromptCache;
use crate::semantic::SemanticCache;
use crate::store::{DistributedStore, RedisStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub struct CacheRegistry {
    config: CacheConfig,
    remote: Option<Arc<dyn DistributedStore>>,
    engines: Mutex<HashMap<String, Arc<CacheEngine>>>,
}

impl CacheRegistry {
    /// Build a registry from configuration. When the distributed layer is
    /// enabled but its pool cannot be created, the registry degrades to
    /// L1-only rather than failing startup.
    pub fn new(config: CacheConfig) -> Self {
        let remote: Option<Arc<dyn DistributedStore>> = if config.remote_enabled {
            match RedisStore::connect(
                &config.redis_url,
                config.connect_timeout,
                config.operation_timeout,
            ) {
                Ok(store) => {
                    info!(url = %config.redis_url, "distributed cache layer enabled");
                    Some(Arc::new(store))
                }
                Err(e) => {
                    warn!(error = %e, "distributed cache unavailable, running L1-only");
                    None
                }
            }
        } else {
            None
        };
        Self::with_store_option(config, remote)
    }

    /// Build a registry around a caller-supplied store, e.g. a process-wide
    /// pool shared with other subsystems, or a test double.
    pub fn with_store(config: CacheConfig, store: Arc<dyn DistributedStore>) -> Self {
        Self::with_store_option(config, Some(store))
    }

    fn with_store_option(config: CacheConfig, remote: Option<Arc<dyn DistributedStore>>) -> Self {
        Self {
            config,
            remote,
            engines: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Engine for a namespace prefix; one instance per prefix for the life of
    /// the registry.
    pub fn engine(&self, prefix: &str) -> Arc<CacheEngine> {
        let mut engines = self
            .engines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        engines
            .entry(prefix.to_string())
            .or_insert_with(|| {
                let config = self.config.clone();
                match &self.remote {
                    Some(remote) => {
                        Arc::new(CacheEngine::with_remote(prefix, config, Arc::clone(remote)))
                    }
                    None => Arc::new(CacheEngine::new(prefix, config)),
                }
            })
            .clone()
    }

    pub fn semantic(&self) -> SemanticCache {
        SemanticCache::new(self.engine(SemanticCache::PREFIX))
    }

    pub fn conversation(&self) -> ConversationCache {
        ConversationCache::new(self.engine(ConversationCache::PREFIX))
    }

    pub fn prompt(&self) -> PromptCache {
        PromptCache::new(self.engine(PromptCache::PREFIX))
    }

    /// Tear down at process shutdown: drop the engines and close the
    /// distributed pool. Consumers still holding an engine degrade to
    /// L1-plus-disabled-L2 behavior.
    pub fn close(&self) {
        self.engines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        if let Some(remote) = &self.remote {
            remote.close();
        }
        info!("cache registry closed");
    }
}

//! Rendered-prompt cache.
//!
//! Prompt templates are rendered per request with variable substitution;
//! rendering the same template with the same variables is pure, so the result
//! is cached under `prompt:{template}:{varsHash}`.

use crate::codec::CachedValue;
use crate::engine::CacheEngine;
use crate::fingerprint::hash_text;
use crate::stats::CacheStats;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub struct PromptCache {
    engine: Arc<CacheEngine>,
}

impl PromptCache {
    pub const PREFIX: &'static str = "prompt";

    pub fn new(engine: Arc<CacheEngine>) -> Self {
        Self { engine }
    }

    /// Hash of a template's variable bindings; `BTreeMap` keeps the
    /// canonical form independent of insertion order.
    pub fn vars_hash(vars: &BTreeMap<String, String>) -> String {
        let canonical = serde_json::to_string(vars).unwrap_or_default();
        hash_text(&canonical)
    }

    fn key(template: &str, vars_hash: &str) -> String {
        format!("{template}:{vars_hash}")
    }

    pub async fn get(&self, template: &str, vars_hash: &str) -> Option<String> {
        match self.engine.get(&Self::key(template, vars_hash)).await {
            Some(CachedValue::Json(serde_json::Value::String(text))) => Some(text),
            _ => None,
        }
    }

    pub async fn set(
        &self,
        template: &str,
        vars_hash: &str,
        rendered: impl Into<String>,
        ttl: Option<Duration>,
    ) {
        let value = CachedValue::Json(serde_json::Value::String(rendered.into()));
        self.engine
            .set(&Self::key(template, vars_hash), value, ttl)
            .await;
    }

    pub async fn invalidate(&self, template: &str, vars_hash: &str) {
        self.engine.delete(&Self::key(template, vars_hash)).await;
    }

    pub async fn clear(&self) {
        self.engine.clear().await;
    }

    pub fn stats(&self) -> CacheStats {
        self.engine.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    fn cache() -> PromptCache {
        PromptCache::new(Arc::new(CacheEngine::new(
            PromptCache::PREFIX,
            CacheConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_rendered_prompt_round_trip() {
        let cache = cache();
        let mut vars = BTreeMap::new();
        vars.insert("name".to_string(), "Ada".to_string());
        let hash = PromptCache::vars_hash(&vars);
        cache.set("greeting", &hash, "Hello, Ada!", None).await;
        assert_eq!(
            cache.get("greeting", &hash).await.as_deref(),
            Some("Hello, Ada!")
        );
    }

    #[tokio::test]
    async fn test_different_vars_different_entry() {
        let cache = cache();
        let mut ada = BTreeMap::new();
        ada.insert("name".to_string(), "Ada".to_string());
        let mut bob = BTreeMap::new();
        bob.insert("name".to_string(), "Bob".to_string());
        cache
            .set("greeting", &PromptCache::vars_hash(&ada), "Hello, Ada!", None)
            .await;
        assert_eq!(
            cache.get("greeting", &PromptCache::vars_hash(&bob)).await,
            None
        );
    }
}

//! Semantic response cache.
//!
//! Caches completed provider responses by request fingerprint, so a repeat of
//! a structurally identical request is answered without a provider call. All
//! storage mechanics live in the engine; this wrapper owns the namespace and
//! the fingerprint convention.

use crate::codec::CachedValue;
use crate::engine::CacheEngine;
use crate::fingerprint::SemanticFingerprint;
use crate::stats::CacheStats;
use crate::types::ChatResponse;
use std::sync::Arc;
use std::time::Duration;

pub struct SemanticCache {
    engine: Arc<CacheEngine>,
}

impl SemanticCache {
    pub const PREFIX: &'static str = "semantic";

    pub fn new(engine: Arc<CacheEngine>) -> Self {
        Self { engine }
    }

    pub async fn get(&self, request: &SemanticFingerprint) -> Option<CachedValue> {
        self.engine.get(&request.key()).await
    }

    /// Typed convenience for the common case: a cached provider response.
    /// A value of any other shape is treated as a miss.
    pub async fn get_response(&self, request: &SemanticFingerprint) -> Option<ChatResponse> {
        self.get(request).await.and_then(CachedValue::into_response)
    }

    pub async fn set(
        &self,
        request: &SemanticFingerprint,
        value: impl Into<CachedValue>,
        ttl_override: Option<Duration>,
    ) {
        self.engine
            .set(&request.key(), value.into(), ttl_override)
            .await;
    }

    pub async fn invalidate(&self, request: &SemanticFingerprint) {
        self.engine.delete(&request.key()).await;
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

    fn cache() -> SemanticCache {
        SemanticCache::new(Arc::new(CacheEngine::new(
            SemanticCache::PREFIX,
            CacheConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_response_round_trip() {
        let cache = cache();
        let req = SemanticFingerprint::new("What is 2+2?", "glm-4-plus").with_temperature(0.7);
        let resp = ChatResponse::new("4", "glm-4-plus");
        cache.set(&req, resp.clone(), None).await;
        assert_eq!(cache.get_response(&req).await, Some(resp));
    }

    #[tokio::test]
    async fn test_temperature_difference_is_a_miss() {
        let cache = cache();
        let warm = SemanticFingerprint::new("p", "m1").with_temperature(0.7);
        let cool = SemanticFingerprint::new("p", "m1").with_temperature(0.8);
        cache
            .set(&warm, CachedValue::Json(serde_json::json!("A")), None)
            .await;
        assert_eq!(cache.get(&cool).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = cache();
        let req = SemanticFingerprint::new("p", "m1");
        cache
            .set(&req, CachedValue::Json(serde_json::json!("A")), None)
            .await;
        cache.invalidate(&req).await;
        assert_eq!(cache.get(&req).await, None);
    }
}

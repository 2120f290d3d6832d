//! Conversation-state cache.
//!
//! Tracks the record and message list of each conversation under two subkeys
//! of the `conversation` namespace: `{id}:record` and `{id}:messages`.
//! Invalidation removes both so a conversation never survives half-cleared.

use crate::codec::CachedValue;
use crate::engine::CacheEngine;
use crate::stats::CacheStats;
use crate::types::{ChatMessage, ConversationRecord};
use std::sync::Arc;
use std::time::Duration;

pub struct ConversationCache {
    engine: Arc<CacheEngine>,
}

impl ConversationCache {
    pub const PREFIX: &'static str = "conversation";

    pub fn new(engine: Arc<CacheEngine>) -> Self {
        Self { engine }
    }

    fn record_key(id: &str) -> String {
        format!("{id}:record")
    }

    fn messages_key(id: &str) -> String {
        format!("{id}:messages")
    }

    pub async fn get_conversation(&self, id: &str) -> Option<ConversationRecord> {
        self.engine
            .get(&Self::record_key(id))
            .await
            .and_then(CachedValue::into_conversation)
    }

    pub async fn get_messages(&self, id: &str) -> Option<Vec<ChatMessage>> {
        self.engine
            .get(&Self::messages_key(id))
            .await
            .and_then(CachedValue::into_messages)
    }

    pub async fn set_conversation(
        &self,
        id: &str,
        record: ConversationRecord,
        ttl: Option<Duration>,
    ) {
        self.engine
            .set(&Self::record_key(id), record.into(), ttl)
            .await;
    }

    pub async fn set_messages(&self, id: &str, messages: Vec<ChatMessage>, ttl: Option<Duration>) {
        self.engine
            .set(&Self::messages_key(id), messages.into(), ttl)
            .await;
    }

    /// Append one message to the cached list, starting a fresh list when none
    /// is cached. Last-writer-wins under concurrent appends to the same id;
    /// the authoritative history lives with the conversation tracker, not here.
    pub async fn append_message(&self, id: &str, message: ChatMessage) {
        let mut messages = self.get_messages(id).await.unwrap_or_default();
        messages.push(message);
        self.set_messages(id, messages, None).await;
    }

    /// Drop both the record and the messages of a conversation.
    pub async fn invalidate(&self, id: &str) {
        self.engine.delete(&Self::record_key(id)).await;
        self.engine.delete(&Self::messages_key(id)).await;
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

    fn cache() -> ConversationCache {
        ConversationCache::new(Arc::new(CacheEngine::new(
            ConversationCache::PREFIX,
            CacheConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_record_round_trip() {
        let cache = cache();
        let record = ConversationRecord::new("c-42", "glm-4-plus", 1_700_000_000)
            .with_title("unit conversion");
        cache.set_conversation("c-42", record.clone(), None).await;
        assert_eq!(cache.get_conversation("c-42").await, Some(record));
    }

    #[tokio::test]
    async fn test_append_starts_fresh_list() {
        let cache = cache();
        cache.append_message("c-1", ChatMessage::user("hi")).await;
        cache
            .append_message("c-1", ChatMessage::assistant("hello"))
            .await;
        let messages = cache.get_messages("c-1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hi");
    }

    #[tokio::test]
    async fn test_invalidate_removes_record_and_messages() {
        let cache = cache();
        cache
            .set_conversation(
                "c-9",
                ConversationRecord::new("c-9", "m", 1_700_000_000),
                None,
            )
            .await;
        cache
            .set_messages("c-9", vec![ChatMessage::user("hi")], None)
            .await;
        cache.invalidate("c-9").await;
        assert_eq!(cache.get_conversation("c-9").await, None);
        assert_eq!(cache.get_messages("c-9").await, None);
    }
}

//! Consumer-facing surfaces: semantic, conversation, and prompt caches wired
//! through the registry.

use ai_cache::store::{DistributedStore, MemoryStore};
use ai_cache::{
    CacheConfig, CacheRegistry, CachedValue, ChatMessage, ChatResponse, ConversationRecord,
    SemanticFingerprint,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

fn registry() -> CacheRegistry {
    CacheRegistry::with_store(CacheConfig::default(), Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn semantic_cache_round_trips_provider_responses() {
    let registry = registry();
    let responses = registry.semantic();

    let request = SemanticFingerprint::new("What is 2+2?", "kimi-k2-0711-preview")
        .with_temperature(0.7)
        .with_web_search(false);
    assert_eq!(responses.get_response(&request).await, None);

    let response = ChatResponse::new("4", "kimi-k2-0711-preview").with_provider("kimi");
    responses.set(&request, response.clone(), None).await;
    assert_eq!(responses.get_response(&request).await, Some(response));

    let stats = responses.stats();
    assert_eq!(stats.writes, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.l1_hits, 1);
}

#[tokio::test]
async fn model_version_difference_does_not_share_values() {
    let registry = registry();
    let responses = registry.semantic();

    let old = SemanticFingerprint::new("summarize this", "kimi-k2-0711-preview");
    let new = SemanticFingerprint::new("summarize this", "kimi-k2-0905-preview");
    responses
        .set(&old, ChatResponse::new("old answer", "kimi-k2-0711-preview"), None)
        .await;
    assert_eq!(responses.get(&new).await, None);
}

#[tokio::test]
async fn temperature_difference_changes_the_key() {
    let registry = registry();
    let responses = registry.semantic();

    let warm = SemanticFingerprint::new("p", "m1").with_temperature(0.7);
    let cool = SemanticFingerprint::new("p", "m1").with_temperature(0.8);
    responses
        .set(&warm, CachedValue::Json(serde_json::json!("A")), None)
        .await;
    assert_eq!(responses.get(&cool).await, None);
}

#[tokio::test]
async fn thinking_mode_flag_changes_the_key() {
    let registry = registry();
    let responses = registry.semantic();

    let plain = SemanticFingerprint::new("p", "m1");
    let thinking = SemanticFingerprint::new("p", "m1").with_thinking_mode(true);
    responses
        .set(&plain, CachedValue::Json(serde_json::json!("A")), None)
        .await;
    assert_eq!(responses.get(&thinking).await, None);
}

#[tokio::test]
async fn conversation_state_survives_invalidation_boundaries() {
    let registry = registry();
    let conversations = registry.conversation();

    let record = ConversationRecord::new("c-7", "glm-4-plus", 1_722_000_000)
        .with_title("routing question");
    conversations.set_conversation("c-7", record.clone(), None).await;
    conversations
        .set_messages(
            "c-7",
            vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
            None,
        )
        .await;

    assert_eq!(conversations.get_conversation("c-7").await, Some(record));
    assert_eq!(conversations.get_messages("c-7").await.unwrap().len(), 2);

    conversations.invalidate("c-7").await;
    assert_eq!(conversations.get_conversation("c-7").await, None);
    assert_eq!(conversations.get_messages("c-7").await, None);
}

#[tokio::test]
async fn conversation_append_reads_back_in_order() {
    let registry = registry();
    let conversations = registry.conversation();

    conversations
        .append_message("c-1", ChatMessage::user("first"))
        .await;
    conversations
        .append_message("c-1", ChatMessage::assistant("second"))
        .await;
    conversations
        .append_message("c-1", ChatMessage::user("third"))
        .await;

    let messages = conversations.get_messages("c-1").await.unwrap();
    let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["first", "second", "third"]);
}

#[tokio::test]
async fn prompt_cache_keys_on_template_and_vars() {
    let registry = registry();
    let prompts = registry.prompt();

    let mut vars = BTreeMap::new();
    vars.insert("tone".to_string(), "formal".to_string());
    let hash = ai_cache::PromptCache::vars_hash(&vars);

    prompts
        .set("system-preamble", &hash, "You are a formal assistant.", None)
        .await;
    assert_eq!(
        prompts.get("system-preamble", &hash).await.as_deref(),
        Some("You are a formal assistant.")
    );

    vars.insert("tone".to_string(), "casual".to_string());
    let other = ai_cache::PromptCache::vars_hash(&vars);
    assert_eq!(prompts.get("system-preamble", &other).await, None);
}

#[tokio::test]
async fn consumers_share_l2_but_not_namespaces() {
    let shared: Arc<dyn DistributedStore> = Arc::new(MemoryStore::new());
    let registry = CacheRegistry::with_store(CacheConfig::default(), Arc::clone(&shared));

    let request = SemanticFingerprint::new("p", "m1");
    registry
        .semantic()
        .set(&request, CachedValue::Json(serde_json::json!("A")), None)
        .await;
    registry
        .conversation()
        .set_messages("c-1", vec![ChatMessage::user("hi")], None)
        .await;

    registry.semantic().clear().await;
    assert_eq!(registry.semantic().get(&request).await, None);
    assert!(registry.conversation().get_messages("c-1").await.is_some());
}

#[tokio::test]
async fn ttl_override_expires_consumer_entries() {
    let registry = registry();
    let conversations = registry.conversation();
    conversations
        .set_messages(
            "c-ttl",
            vec![ChatMessage::user("hi")],
            Some(Duration::from_millis(100)),
        )
        .await;
    assert!(conversations.get_messages("c-ttl").await.is_some());
    // L1 expires; the L2 copy under its own longer TTL then repopulates L1.
    tokio::time::sleep(Duration::from_millis(250)).await;
    let stats_before = conversations.stats();
    assert!(conversations.get_messages("c-ttl").await.is_some());
    let stats_after = conversations.stats();
    assert_eq!(stats_after.l2_hits, stats_before.l2_hits + 1);
}

#[tokio::test]
async fn registry_close_is_idempotent_and_leaves_l1_functional() {
    let registry = registry();
    let responses = registry.semantic();
    let request = SemanticFingerprint::new("p", "m1");
    responses
        .set(&request, CachedValue::Json(serde_json::json!("A")), None)
        .await;

    registry.close();
    registry.close();
    // The consumer keeps its engine handle; L1 reads still work.
    assert!(responses.get(&request).await.is_some());
}

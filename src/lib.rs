//! # ai-cache
//!
//! Multi-layer response cache for AI orchestration services.
//!
//! ## Overview
//!
//! Chat requests routed to LLM providers are expensive; structurally
//! identical requests are common. This crate caches provider responses,
//! conversation state, and rendered prompts across two layers:
//!
//! - **L1**: a bounded, LRU-evicted, per-entry-TTL in-process map; the fast
//!   path every lookup hits first.
//! - **L2**: an optional distributed key/value store (Redis) shared across
//!   processes; survives restarts and warms up cold instances.
//!
//! Reads go through (L1 miss → L2 lookup → L1 population), writes fan out to
//! both layers, and every distributed failure degrades to a cache miss.
//! The worst case of any cache malfunction is recomputing a value at the
//! origin, never an error surfacing to a request.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheRegistry`] | Startup-constructed composition root; one engine per namespace |
//! | [`CacheEngine`] | Read-through/write-through orchestration over L1 + L2 |
//! | [`SemanticCache`] | Provider responses keyed by request fingerprint |
//! | [`ConversationCache`] | Conversation records and message lists |
//! | [`PromptCache`] | Rendered prompt text by template and variables |
//! | [`SemanticFingerprint`] | Deterministic key from normalized request parameters |
//! | [`ValueCodec`] | Typed value round-tripping through the text-only L2 transport |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_cache::{CacheConfig, CacheRegistry, ChatResponse, SemanticFingerprint};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = CacheRegistry::new(CacheConfig::from_env());
//!     let responses = registry.semantic();
//!
//!     let request = SemanticFingerprint::new("What is 2+2?", "glm-4-plus")
//!         .with_temperature(0.7);
//!
//!     if let Some(cached) = responses.get_response(&request).await {
//!         println!("cache hit: {}", cached.content);
//!         return;
//!     }
//!     // ... call the provider, then write through:
//!     let response = ChatResponse::new("4", "glm-4-plus");
//!     responses.set(&request, response, None).await;
//!
//!     registry.close();
//! }
//! ```

pub mod codec;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod fingerprint;
pub mod prompt;
pub mod registry;
pub mod semantic;
pub mod stats;
pub mod store;
pub mod types;

pub mod error;
pub use error::CacheError;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, CacheError>;

// Re-export main types for convenience
pub use codec::{CachedValue, Transportable, ValueCodec};
pub use config::CacheConfig;
pub use conversation::ConversationCache;
pub use engine::CacheEngine;
pub use fingerprint::{hash_text, SemanticFingerprint};
pub use prompt::PromptCache;
pub use registry::CacheRegistry;
pub use semantic::SemanticCache;
pub use stats::CacheStats;
pub use store::{DistributedStore, LocalStore, MemoryStore, RedisStore};
pub use types::{ChatMessage, ChatResponse, ConversationRecord, MessageRole, TokenUsage};

//! Semantic fingerprinting of request parameters.
//!
//! Two requests share a cache entry only when every decision-relevant
//! parameter matches: the full prompt text, the full model identifier
//! (version suffix included), temperature at two-decimal granularity, every
//! feature flag, and any extra parameters. Nothing is truncated or dropped
//! before hashing; collisions between logically distinct requests would serve
//! a wrong answer, which is worse than any key-size saving.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Normalized request parameters that form a cache key.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticFingerprint {
    prompt: String,
    model: String,
    temperature: Option<f64>,
    thinking_mode: bool,
    web_search: bool,
    system_prompt_hash: Option<String>,
    extra: BTreeMap<String, serde_json::Value>,
}

impl SemanticFingerprint {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            temperature: None,
            thinking_mode: false,
            web_search: false,
            system_prompt_hash: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_thinking_mode(mut self, enabled: bool) -> Self {
        self.thinking_mode = enabled;
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    /// Attach the system prompt by hash; use [`hash_text`] to produce one.
    pub fn with_system_prompt_hash(mut self, hash: impl Into<String>) -> Self {
        self.system_prompt_hash = Some(hash.into());
        self
    }

    /// Attach an arbitrary extra parameter. Parameter names are sorted into
    /// the canonical form, so insertion order never changes the key.
    pub fn with_param(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Canonical ordered representation: sorted field names, trimmed prompt,
    /// rounded temperature, explicit booleans.
    fn canonical(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("prompt".to_string(), self.prompt.trim().to_string());
        fields.insert("model".to_string(), self.model.clone());
        if let Some(t) = self.temperature {
            fields.insert("temperature".to_string(), format!("{t:.2}"));
        }
        fields.insert("thinking_mode".to_string(), self.thinking_mode.to_string());
        fields.insert("web_search".to_string(), self.web_search.to_string());
        if let Some(ref hash) = self.system_prompt_hash {
            fields.insert("system_prompt_hash".to_string(), hash.clone());
        }
        for (name, value) in &self.extra {
            fields.insert(format!("param:{name}"), value.to_string());
        }
        fields
    }

    /// Deterministic cache key: SHA-256 over the canonical representation,
    /// lowercase hex.
    pub fn key(&self) -> String {
        let canonical =
            serde_json::to_string(&self.canonical()).unwrap_or_else(|_| String::new());
        hash_text(&canonical)
    }
}

/// SHA-256 of a text, lowercase hex. Also used to condense system prompts
/// before they enter a fingerprint.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

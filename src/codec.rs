//! Value codec for the distributed store.
//!
//! The distributed layer transports text only, so every cached value is
//! encoded to a JSON string on the way out and reconstructed on the way back.
//! Typed domain values carry a `"__type__"` discriminator; decoding goes
//! through an explicit registry of decode functions keyed by that tag, so a
//! value written by one process can be rebuilt as the proper domain type by
//! another.
//!
//! Decoding never fails: an unrecognized discriminator (written by a newer
//! consumer) is stripped and the remaining fields come back as an untyped
//! map, and malformed text comes back as a raw string value. Both paths log
//! at warning level.

use crate::types::{ChatMessage, ChatResponse, ConversationRecord};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Field name carrying the type discriminator on the wire.
pub const TYPE_FIELD: &str = "__type__";

/// A value held by the cache: either plain JSON or one of the typed domain
/// objects the consumers store.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Json(serde_json::Value),
    Response(ChatResponse),
    Conversation(ConversationRecord),
    Messages(Vec<ChatMessage>),
}

impl CachedValue {
    /// Short tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            CachedValue::Json(_) => "json",
            CachedValue::Response(_) => ChatResponse::TYPE_TAG,
            CachedValue::Conversation(_) => ConversationRecord::TYPE_TAG,
            CachedValue::Messages(_) => MessageList::TYPE_TAG,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            CachedValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<ChatResponse> {
        match self {
            CachedValue::Response(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_conversation(self) -> Option<ConversationRecord> {
        match self {
            CachedValue::Conversation(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_messages(self) -> Option<Vec<ChatMessage>> {
        match self {
            CachedValue::Messages(m) => Some(m),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for CachedValue {
    fn from(v: serde_json::Value) -> Self {
        CachedValue::Json(v)
    }
}

impl From<ChatResponse> for CachedValue {
    fn from(r: ChatResponse) -> Self {
        CachedValue::Response(r)
    }
}

impl From<ConversationRecord> for CachedValue {
    fn from(r: ConversationRecord) -> Self {
        CachedValue::Conversation(r)
    }
}

impl From<Vec<ChatMessage>> for CachedValue {
    fn from(m: Vec<ChatMessage>) -> Self {
        CachedValue::Messages(m)
    }
}

/// Implemented by domain types that travel through the distributed store.
///
/// The discriminator is declared here and the registry maps it back to a
/// decode function; there is no runtime probing of value shapes.
pub trait Transportable: Serialize + DeserializeOwned {
    const TYPE_TAG: &'static str;
}

impl Transportable for ChatResponse {
    const TYPE_TAG: &'static str = "chat_response";
}

impl Transportable for ConversationRecord {
    const TYPE_TAG: &'static str = "conversation_record";
}

/// Wire wrapper for message lists; a bare JSON array cannot carry the
/// discriminator field.
#[derive(Debug, Serialize, Deserialize)]
struct MessageList {
    items: Vec<ChatMessage>,
}

impl Transportable for MessageList {
    const TYPE_TAG: &'static str = "chat_messages";
}

impl From<MessageList> for CachedValue {
    fn from(list: MessageList) -> Self {
        CachedValue::Messages(list.items)
    }
}

type DecodeFn = fn(&serde_json::Value) -> std::result::Result<CachedValue, serde_json::Error>;

fn decode_as<T>(value: &serde_json::Value) -> std::result::Result<CachedValue, serde_json::Error>
where
    T: Transportable + Into<CachedValue>,
{
    Ok(serde_json::from_value::<T>(value.clone())?.into())
}

/// Codec with a type-discriminator registry.
pub struct ValueCodec {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl ValueCodec {
    /// Empty codec with no registered types; plain JSON still round-trips.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Codec with every domain type of this crate registered.
    pub fn with_defaults() -> Self {
        let mut codec = Self::new();
        codec.register::<ChatResponse>();
        codec.register::<ConversationRecord>();
        codec.register::<MessageList>();
        codec
    }

    /// Register a transportable type. Later registrations win on tag clashes.
    pub fn register<T>(&mut self)
    where
        T: Transportable + Into<CachedValue>,
    {
        self.decoders.insert(T::TYPE_TAG, decode_as::<T>);
    }

    /// Encode a value to its wire text. Typed values gain the discriminator
    /// field; plain JSON is written as-is.
    pub fn encode(&self, value: &CachedValue) -> Result<String> {
        let wire = match value {
            CachedValue::Json(v) => v.clone(),
            CachedValue::Response(r) => tagged(serde_json::to_value(r)?, ChatResponse::TYPE_TAG),
            CachedValue::Conversation(r) => {
                tagged(serde_json::to_value(r)?, ConversationRecord::TYPE_TAG)
            }
            CachedValue::Messages(m) => tagged(
                serde_json::json!({ "items": m }),
                MessageList::TYPE_TAG,
            ),
        };
        Ok(serde_json::to_string(&wire)?)
    }

    /// Decode wire text back into a value. Never fails; degraded outcomes are
    /// logged and returned as plain values.
    pub fn decode(&self, text: &str) -> CachedValue {
        let parsed: serde_json::Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "cached text is not valid JSON, returning raw string");
                return CachedValue::Json(serde_json::Value::String(text.to_string()));
            }
        };

        let mut map = match parsed {
            serde_json::Value::Object(map) => map,
            other => return CachedValue::Json(other),
        };

        let Some(tag_value) = map.remove(TYPE_FIELD) else {
            return CachedValue::Json(serde_json::Value::Object(map));
        };
        let tag = tag_value.as_str().unwrap_or_default().to_string();

        let body = serde_json::Value::Object(map);
        match self.decoders.get(tag.as_str()) {
            Some(decode) => match decode(&body) {
                Ok(value) => value,
                Err(e) => {
                    warn!(tag = %tag, error = %e, "typed cache value failed to decode, returning untyped map");
                    CachedValue::Json(body)
                }
            },
            None => {
                warn!(tag = %tag, "unknown cache value type, returning untyped map");
                CachedValue::Json(body)
            }
        }
    }
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn tagged(mut value: serde_json::Value, tag: &str) -> serde_json::Value {
    if let serde_json::Value::Object(ref mut map) = value {
        map.insert(TYPE_FIELD.to_string(), serde_json::Value::String(tag.to_string()));
    }
    value
}

//! Core records exchanged between agents: events and memory entries.
//!
//! An [`Event`] is immutable once constructed. Its identity is positional
//! (publish order), so there is no id field; two publishes of the same event
//! are two history entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Topic;

/// Free-form event payload, keyed by field name.
pub type Payload = BTreeMap<String, serde_json::Value>;

/// Convert a JSON value into a [`Payload`].
///
/// Objects contribute their fields directly. Any other value is stored
/// under a single `value` key; `null` yields an empty payload.
pub fn payload_from(value: serde_json::Value) -> Payload {
    match value {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        serde_json::Value::Null => Payload::new(),
        other => {
            let mut payload = Payload::new();
            payload.insert("value".to_owned(), other);
            payload
        }
    }
}

/// A message published on the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    timestamp: DateTime<Utc>,
    topic: Topic,
    source: String,
    title: String,
    memo: String,
    #[ts(type = "Record<string, unknown>")]
    payload: Payload,
}

impl Event {
    /// Build an event stamped with the current wall-clock time.
    ///
    /// `source` is the name of the producing agent.
    pub fn new(
        source: impl Into<String>,
        topic: Topic,
        title: impl Into<String>,
        memo: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            topic,
            source: source.into(),
            title: title.into(),
            memo: memo.into(),
            payload,
        }
    }

    /// When the event was produced.
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Topic the event was published on.
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    /// Name of the producing agent.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Short headline.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Narrative memo.
    pub fn memo(&self) -> &str {
        &self.memo
    }

    /// Structured payload.
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The payload field `key`, if present.
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.payload.get(key)
    }

    /// Summarize the event for an agent's memory window.
    pub fn summary(&self) -> MemoryEntry {
        MemoryEntry {
            timestamp: self.timestamp,
            source: self.source.clone(),
            topic: self.topic,
            title: self.title.clone(),
            memo: self.memo.clone(),
        }
    }
}

/// One received event as remembered by an agent (payload dropped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemoryEntry {
    /// When the remembered event was produced.
    pub timestamp: DateTime<Utc>,
    /// Producing agent.
    pub source: String,
    /// Topic it arrived on.
    pub topic: Topic,
    /// Headline.
    pub title: String,
    /// Memo text.
    pub memo: String,
}

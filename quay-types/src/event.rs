//! Event types for the in-memory topic broker.
//!
//! An event is a topic name, a small string-to-string metadata mapping
//! (typically inbound webhook headers), and an arbitrary JSON payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The unit of delivery in the event broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParams {
    /// The topic this event belongs to. Rewritten by the broker for
    /// sub-topic routing before enqueueing.
    pub topic: String,

    /// Delivery metadata, e.g. webhook headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// The event payload.
    #[serde(rename = "eventPayload", default)]
    pub payload: serde_json::Value,
}

impl EventParams {
    /// Creates an event with an empty metadata mapping.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            metadata: BTreeMap::new(),
            payload,
        }
    }

    /// Adds one metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A catalog record flowing through the enrichment pipeline.
///
/// The `spec` field holds arbitrary JSON whose structure is defined by the
/// entity kind. Intermediators mutate entities in place; the processor
/// borrows one mutably for the duration of a single pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// API version of the entity envelope, e.g. `backstage.io/v1alpha1`.
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// The entity kind, e.g. `Component`, `Resource`, `Template`.
    pub kind: String,

    /// Identity and annotations.
    pub metadata: EntityMetadata,

    /// Kind-specific free-form payload.
    #[serde(default)]
    pub spec: serde_json::Map<String, serde_json::Value>,
}

impl Entity {
    /// Creates a bare entity with the given kind and name.
    #[must_use]
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: None,
            kind: kind.into(),
            metadata: EntityMetadata {
                name: name.into(),
                ..EntityMetadata::default()
            },
            spec: serde_json::Map::new(),
        }
    }

    /// Returns a string field from `spec`, if present.
    pub fn spec_str(&self, key: &str) -> Option<&str> {
        self.spec.get(key).and_then(|v| v.as_str())
    }

    /// Returns a boolean field from `spec`, if present.
    pub fn spec_bool(&self, key: &str) -> Option<bool> {
        self.spec.get(key).and_then(|v| v.as_bool())
    }

    /// Sets a string field on `spec`, overwriting any previous value.
    pub fn set_spec_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.spec
            .insert(key.into(), serde_json::Value::String(value.into()));
    }

    /// Returns an annotation value, if present.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    /// Adds or overwrites an annotation.
    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.annotations.insert(key.into(), value.into());
    }

    /// Returns `true` if every listed annotation key is present.
    pub fn has_annotations(&self, keys: &[&str]) -> bool {
        keys.iter()
            .all(|k| self.metadata.annotations.contains_key(*k))
    }
}

/// Entity identity, annotations, and labels.
///
/// Annotation keys are namespaced strings (`domain/key`). Writers may only
/// add or overwrite keys inside their own namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Entity name, unique per kind and namespace.
    pub name: String,

    /// Namespace, defaulting to `default` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Stable unique id assigned by the catalog, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Namespaced `domain/key` annotation mapping.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Free-form label mapping.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Refresh bookkeeping written by the refresh-state intermediator.
    #[serde(
        rename = "refreshState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_state: Option<RefreshStateStamp>,
}

/// When an entity was last refreshed and when the next refresh is due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshStateStamp {
    /// When the catalog plans to refresh this entity next.
    #[serde(rename = "nextUpdateAt")]
    pub next_update_at: String,

    /// When this stamp was written.
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

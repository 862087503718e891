//! Shared annotation cache.
//!
//! Remembers, per entity ref, the `github.com/*` annotations of entities
//! that are already fully annotated so repeat passes skip the network.
//! Constructed once at service start and handed by reference to whoever
//! needs it; lives for the process lifetime and is only invalidated by a
//! restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Entity-ref-keyed cache of previously resolved annotations.
#[derive(Debug, Clone, Default)]
pub struct AnnotationCache {
    entries: Arc<RwLock<HashMap<String, BTreeMap<String, String>>>>,
}

impl AnnotationCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached annotations for an entity ref.
    pub async fn get(&self, entity_ref: &str) -> Option<BTreeMap<String, String>> {
        self.entries.read().await.get(entity_ref).cloned()
    }

    /// Records the annotations for an entity ref.
    pub async fn insert(&self, entity_ref: impl Into<String>, annotations: BTreeMap<String, String>) {
        self.entries
            .write()
            .await
            .insert(entity_ref.into(), annotations);
    }

    /// Returns `true` when nothing has been cached yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Number of cached entity refs.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

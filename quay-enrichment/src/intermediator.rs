//! The intermediator contract.
//!
//! An intermediator declares which hooks it implements through an explicit
//! capability set; the processor queries the set instead of probing for
//! methods. Hooks it does not declare are never invoked, and their default
//! bodies are no-ops so implementors only write the ones they claim.

use crate::error::EnrichmentResult;
use async_trait::async_trait;
use quay_types::{Entity, LocationSpec, ProcessingResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;

/// A hook an intermediator can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Invoked before an entity is persisted.
    PreHandle,
    /// Invoked after location resolution.
    PostHandle,
    /// Veto gate over an entity's candidacy.
    ValidateEntityKind,
}

/// A pluggable enrichment step.
///
/// Hooks mutate the entity in place. Order matters: a later intermediator
/// observes every mutation an earlier one made in the same pass.
#[async_trait]
pub trait Intermediator: Send + Sync {
    /// Identifies this intermediator in logs. Expected to be unique within
    /// a registration list; uniqueness is not enforced.
    fn name(&self) -> &str;

    /// The hooks this intermediator implements.
    fn capabilities(&self) -> &[Capability];

    /// Pre-persistence hook. May emit sibling entities or relations.
    async fn pre_handle(
        &self,
        entity: &mut Entity,
        location: &LocationSpec,
        emit: &Emitter,
        origin: &LocationSpec,
        cache: &ProcessorCache,
    ) -> EnrichmentResult<()> {
        let _ = (entity, location, emit, origin, cache);
        Ok(())
    }

    /// Post-resolution hook.
    async fn post_handle(
        &self,
        entity: &mut Entity,
        location: &LocationSpec,
        emit: &Emitter,
    ) -> EnrichmentResult<()> {
        let _ = (entity, location, emit);
        Ok(())
    }

    /// Veto gate. Returning `Ok(false)` stops further processing of the
    /// entity; errors are treated the same as a veto.
    async fn validate_entity_kind(&self, entity: &Entity) -> EnrichmentResult<bool> {
        let _ = entity;
        Ok(true)
    }
}

/// Sink for sibling entities and relations produced during a pass.
///
/// Cloneable; the receiving half is handed to whoever assembles the pass.
#[derive(Debug, Clone)]
pub struct Emitter {
    tx: UnboundedSender<ProcessingResult>,
}

impl Emitter {
    /// Creates an emitter and the receiver draining it.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<ProcessingResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emits one processing result. Results emitted after the receiver is
    /// gone are dropped silently.
    pub fn emit(&self, result: ProcessingResult) {
        let _ = self.tx.send(result);
    }
}

/// Key-value scratch space scoped to a processing pass hierarchy.
///
/// Explicitly constructed and handed to pre-handle hooks; never
/// process-global.
#[derive(Debug, Clone, Default)]
pub struct ProcessorCache {
    inner: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl ProcessorCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a cached value.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.read().await.get(key).cloned()
    }

    /// Stores a value, overwriting any previous one.
    pub async fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        self.inner.write().await.insert(key.into(), value);
    }
}

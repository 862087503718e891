//! The entity processor — orchestrates intermediators over one entity pass.

use crate::intermediator::{Capability, Emitter, Intermediator, ProcessorCache};
use quay_types::{Entity, LocationSpec};
use std::sync::Arc;
use tracing::{debug, error};

/// Fans pre/post hooks out over an ordered intermediator list.
///
/// The list is fixed at construction. Hooks run strictly sequentially in
/// registration order; each is wrapped in its own failure boundary so one
/// intermediator's error never stops the others. Only
/// [`validate_entity_kind`](Self::validate_entity_kind) fails closed.
pub struct EntityProcessor {
    intermediators: Vec<Arc<dyn Intermediator>>,
}

impl EntityProcessor {
    /// Creates a processor over an ordered intermediator list.
    #[must_use]
    pub fn new(intermediators: Vec<Arc<dyn Intermediator>>) -> Self {
        Self { intermediators }
    }

    /// Identifies the processor in catalog logs.
    #[must_use]
    pub fn processor_name(&self) -> &'static str {
        "quay-entity-processor"
    }

    /// Asks every declaring intermediator to vote on the entity.
    ///
    /// The first `false` vote or error rejects the entity; an error during
    /// validation counts as a rejection, not a pass.
    pub async fn validate_entity_kind(&self, entity: &Entity) -> bool {
        for intermediator in &self.intermediators {
            if !intermediator
                .capabilities()
                .contains(&Capability::ValidateEntityKind)
            {
                debug!(
                    "intermediator {} has no validate-entity-kind hook",
                    intermediator.name()
                );
                continue;
            }

            debug!(
                "validate-entity-kind:{} {}",
                intermediator.name(),
                entity.metadata.name
            );
            match intermediator.validate_entity_kind(entity).await {
                Ok(true) => {}
                Ok(false) => return false,
                Err(err) => {
                    error!(
                        "{} failed to validate {}: {err}",
                        intermediator.name(),
                        entity.metadata.name
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Runs every declared pre-handle hook against the entity, in order.
    ///
    /// Hook failures are logged and skipped; the entity — as mutated by the
    /// hooks that did succeed — is always handed back to the caller.
    pub async fn pre_process_entity(
        &self,
        entity: &mut Entity,
        location: &LocationSpec,
        emit: &Emitter,
        origin: &LocationSpec,
        cache: &ProcessorCache,
    ) {
        for intermediator in &self.intermediators {
            if !intermediator.capabilities().contains(&Capability::PreHandle) {
                debug!(
                    "intermediator {} has no pre-handle hook",
                    intermediator.name()
                );
                continue;
            }

            debug!(
                "pre-process-entity:{} {}",
                intermediator.name(),
                entity.metadata.name
            );
            if let Err(err) = intermediator
                .pre_handle(entity, location, emit, origin, cache)
                .await
            {
                error!(
                    "{} failed to pre-process {}: {err}",
                    intermediator.name(),
                    entity.metadata.name
                );
            }
        }
    }

    /// Runs every declared post-handle hook against the entity, in order,
    /// with the same isolation discipline as pre-processing.
    pub async fn post_process_entity(
        &self,
        entity: &mut Entity,
        location: &LocationSpec,
        emit: &Emitter,
    ) {
        for intermediator in &self.intermediators {
            if !intermediator
                .capabilities()
                .contains(&Capability::PostHandle)
            {
                debug!(
                    "intermediator {} has no post-handle hook",
                    intermediator.name()
                );
                continue;
            }

            debug!(
                "post-process-entity:{} {}",
                intermediator.name(),
                entity.metadata.name
            );
            if let Err(err) = intermediator.post_handle(entity, location, emit).await {
                error!(
                    "{} failed to post-process {}: {err}",
                    intermediator.name(),
                    entity.metadata.name
                );
            }
        }
    }
}

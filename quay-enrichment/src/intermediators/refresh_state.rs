//! Refresh-state stamping.
//!
//! Copies the catalog's refresh bookkeeping onto the entity so the portal
//! can show when an entity was last refreshed and when the next refresh is
//! due. Strictly best-effort: any failure leaves the entity unstamped.

use crate::error::EnrichmentResult;
use crate::intermediator::{Capability, Emitter, Intermediator};
use async_trait::async_trait;
use quay_catalog::CatalogClient;
use quay_types::{Entity, EntityRef, LocationSpec, RefreshStateStamp};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration for the refresh-state intermediator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshStateConfig {
    /// Whether the intermediator runs at all.
    pub enabled: bool,
}

impl Default for RefreshStateConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Stamps entities with their catalog refresh state.
pub struct RefreshStateIntermediator {
    config: RefreshStateConfig,
    catalog: Arc<CatalogClient>,
}

impl RefreshStateIntermediator {
    /// Creates the intermediator.
    pub fn new(config: RefreshStateConfig, catalog: Arc<CatalogClient>) -> Self {
        Self { config, catalog }
    }
}

#[async_trait]
impl Intermediator for RefreshStateIntermediator {
    fn name(&self) -> &str {
        "refresh-state-intermediator"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::PostHandle]
    }

    async fn post_handle(
        &self,
        entity: &mut Entity,
        _location: &LocationSpec,
        _emit: &Emitter,
    ) -> EnrichmentResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let entity_ref = EntityRef::of(entity);
        match self.catalog.refresh_state(&entity_ref).await {
            Ok(records) => {
                let Some(first) = records.first() else {
                    info!("no refresh state found for entity {entity_ref}");
                    return Ok(());
                };
                entity.metadata.refresh_state = Some(RefreshStateStamp {
                    next_update_at: first.next_update_at.clone(),
                    updated_at: chrono::Utc::now().to_rfc3339(),
                });
            }
            Err(err) => {
                warn!("unable to fetch refresh state for entity {entity_ref}: {err}");
            }
        }

        Ok(())
    }
}

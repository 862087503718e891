//! Cluster identification.
//!
//! Service components deploy onto clusters the portal knows about as
//! catalog resources. This intermediator asks the deployment system which
//! clusters a repository ships to, annotates the entity per environment,
//! and emits dependency relations towards the matching cluster entities.

use crate::error::{EnrichmentError, EnrichmentResult};
use crate::intermediator::{Capability, Emitter, Intermediator};
use async_trait::async_trait;
use quay_catalog::CatalogClient;
use quay_types::{
    Entity, EntityRef, EntityRelation, LocationSpec, ProcessingResult, RELATION_DEPENDENCY_OF,
    RELATION_DEPENDS_ON,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const SOURCE_LOCATION_ANNOTATION: &str = "backstage.io/source-location";
const KUBERNETES_ID_ANNOTATION: &str = "backstage.io/kubernetes-id";
const CLUSTER_ANNOTATION_PREFIX: &str = "quay.dev/cluster-";

/// A cluster a repository deploys to, per environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationCluster {
    /// Deployment environment, e.g. `qa`, `prod`.
    pub environment: String,
    /// Cluster name as the deployment system knows it.
    pub cluster: String,
}

/// Resolves which clusters a repository deploys to.
#[async_trait]
pub trait ClusterLookup: Send + Sync {
    /// Returns the clusters hosting the given repository's workloads.
    async fn application_clusters(&self, repo: &str) -> EnrichmentResult<Vec<ApplicationCluster>>;
}

/// Configuration for the cluster identifier intermediator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterIdentifierConfig {
    /// Whether the intermediator runs at all.
    pub enabled: bool,
    /// Organization whose tree URLs identify repositories.
    pub org: String,
}

impl Default for ClusterIdentifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            org: "acme".to_string(),
        }
    }
}

/// Annotates service components with their deployment clusters.
pub struct ClusterIdentifierIntermediator {
    config: ClusterIdentifierConfig,
    lookup: Arc<dyn ClusterLookup>,
    catalog: Arc<CatalogClient>,
    catalog_clusters: RwLock<Option<Vec<Entity>>>,
    source_location_regex: Regex,
}

impl ClusterIdentifierIntermediator {
    /// Creates the intermediator.
    pub fn new(
        config: ClusterIdentifierConfig,
        lookup: Arc<dyn ClusterLookup>,
        catalog: Arc<CatalogClient>,
    ) -> Self {
        let source_location_regex = Regex::new(&format!(
            "{}/(.*?)/tree",
            regex::escape(&config.org)
        ))
        .expect("valid source location regex");

        Self {
            config,
            lookup,
            catalog,
            catalog_clusters: RwLock::new(None),
            source_location_regex,
        }
    }

    /// Returns the catalog's cluster entities, fetched once per process.
    async fn clusters(&self) -> EnrichmentResult<Vec<Entity>> {
        if let Some(clusters) = self.catalog_clusters.read().await.as_ref() {
            return Ok(clusters.clone());
        }

        let fetched = self.catalog.entities_by_filter("spec.type=eks").await?;
        *self.catalog_clusters.write().await = Some(fetched.clone());
        Ok(fetched)
    }
}

#[async_trait]
impl Intermediator for ClusterIdentifierIntermediator {
    fn name(&self) -> &str {
        "cluster-identifier-intermediator"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::PostHandle]
    }

    async fn post_handle(
        &self,
        entity: &mut Entity,
        _location: &LocationSpec,
        emit: &Emitter,
    ) -> EnrichmentResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        if entity.kind.to_lowercase() != "component" || entity.spec_str("type") != Some("service")
        {
            debug!(
                "no conditions met to identify cluster info for entity {}",
                entity.metadata.name
            );
            return Ok(());
        }

        let url = entity
            .annotation(SOURCE_LOCATION_ANNOTATION)
            .map(str::to_string)
            .ok_or_else(|| {
                EnrichmentError::Validation(format!(
                    "annotation {SOURCE_LOCATION_ANNOTATION} not found for {}",
                    entity.metadata.name
                ))
            })?;

        let repo = self
            .source_location_regex
            .captures(&url)
            .map(|captures| captures[1].to_string())
            .ok_or_else(|| {
                EnrichmentError::Validation(format!(
                    "annotation {SOURCE_LOCATION_ANNOTATION} for {} does not point at a tree url",
                    entity.metadata.name
                ))
            })?;

        let catalog_clusters = self.clusters().await?;

        let clusters = self.lookup.application_clusters(&repo).await?;
        if clusters.is_empty() {
            debug!("no cluster found for entity {}", entity.metadata.name);
            return Ok(());
        }

        let self_ref = EntityRef::of(entity);
        for cluster in &clusters {
            entity.set_annotation(
                format!("{CLUSTER_ANNOTATION_PREFIX}{}", cluster.environment),
                cluster.cluster.clone(),
            );

            let matching: Vec<&Entity> = catalog_clusters
                .iter()
                .filter(|e| e.annotation(KUBERNETES_ID_ANNOTATION) == Some(cluster.cluster.as_str()))
                .collect();
            if matching.is_empty() {
                warn!(
                    "unable to find cluster relations for {} using cluster {}, perhaps this \
                     cluster is not in the catalog",
                    entity.metadata.name, cluster.cluster
                );
                continue;
            }

            for item in matching {
                let target = EntityRef::new(
                    item.kind.clone(),
                    self_ref.namespace.clone(),
                    item.metadata.name.clone(),
                );
                emit.emit(ProcessingResult::Relation(EntityRelation::new(
                    self_ref.clone(),
                    RELATION_DEPENDS_ON,
                    target.clone(),
                )));
                emit.emit(ProcessingResult::Relation(EntityRelation::new(
                    target,
                    RELATION_DEPENDENCY_OF,
                    self_ref.clone(),
                )));
            }
        }

        debug!(
            "clusters successfully included for entity {}",
            entity.metadata.name
        );

        Ok(())
    }
}

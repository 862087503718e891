//! GitHub repository annotations.
//!
//! Resolves the repository behind an entity and stamps it with repository
//! id, creation date, and branch-protection facts. A shared cache keyed by
//! entity ref remembers entities that already carry every key so repeat
//! passes skip the GraphQL call entirely.

use crate::cache::AnnotationCache;
use crate::error::EnrichmentResult;
use crate::github::GithubClient;
use crate::intermediator::{Capability, Emitter, Intermediator};
use async_trait::async_trait;
use quay_catalog::CatalogClient;
use quay_types::{Entity, EntityRef, LocationSpec};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Annotation key for the numeric repository id.
pub const REPOSITORY_ID: &str = "github.com/repository-id";
/// Annotation key for the repository creation timestamp.
pub const REPOSITORY_CREATED_AT: &str = "github.com/repository-created-at";
/// Annotation key for the `org/repo` slug.
pub const PROJECT_SLUG: &str = "github.com/project-slug";
/// Annotation key for the default branch's required approval count.
pub const BRANCH_PROTECTION_REQUIRED_APPROVALS: &str =
    "github.com/branch-protection-required-approvals";
/// Annotation key for whether code-owner reviews are required.
pub const BRANCH_PROTECTION_REQUIRE_CODE_OWNER_REVIEWS: &str =
    "github.com/branch-protection-require-code-owner-reviews";
/// Annotation key for whether the default branch has a protection rule.
pub const BRANCH_PROTECTION_RULES: &str = "github.com/branch-protection-rules";

/// Every key this intermediator writes. Other consumers depend on these
/// exact strings.
pub const ANNOTATION_KEYS: [&str; 6] = [
    REPOSITORY_ID,
    REPOSITORY_CREATED_AT,
    PROJECT_SLUG,
    BRANCH_PROTECTION_REQUIRED_APPROVALS,
    BRANCH_PROTECTION_REQUIRE_CODE_OWNER_REVIEWS,
    BRANCH_PROTECTION_RULES,
];

const SOURCE_LOCATION_KEYS: [&str; 2] = [
    "backstage.io/source-location",
    "backstage.io/managed-by-location",
];

const CACHED_KINDS: [&str; 6] = ["Component", "Resource", "Template", "API", "System", "Domain"];

/// Configuration for the GitHub annotation intermediator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubAnnotationConfig {
    /// Whether the intermediator runs at all.
    pub enabled: bool,
    /// GitHub organization whose tree URLs identify repositories.
    pub org: String,
}

impl Default for GithubAnnotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            org: "acme".to_string(),
        }
    }
}

/// Stamps entities with GitHub repository annotations.
pub struct GithubAnnotationIntermediator {
    config: GithubAnnotationConfig,
    github: Arc<dyn GithubClient>,
    catalog: Arc<CatalogClient>,
    cache: AnnotationCache,
    source_location_regex: Regex,
}

impl GithubAnnotationIntermediator {
    /// Creates the intermediator. The cache is shared: hand the same
    /// instance to anything else that wants to observe warm-up state.
    pub fn new(
        config: GithubAnnotationConfig,
        github: Arc<dyn GithubClient>,
        catalog: Arc<CatalogClient>,
        cache: AnnotationCache,
    ) -> Self {
        let source_location_regex = Regex::new(&format!(
            "{}/(.*?)/tree",
            regex::escape(&config.org)
        ))
        .expect("valid source location regex");

        Self {
            config,
            github,
            catalog,
            cache,
            source_location_regex,
        }
    }

    /// Populates the cache from one catalog query when it is still empty.
    ///
    /// Entities already carrying every annotation key are recorded so later
    /// passes copy their annotations back instead of calling GitHub. The
    /// query reads a single page; pagination cursors are not followed, so a
    /// catalog larger than one page leaves the cache incomplete.
    async fn warm_cache(&self) {
        if !self.cache.is_empty().await {
            return;
        }

        let filters: Vec<(&str, &str)> =
            CACHED_KINDS.iter().map(|kind| ("kind", *kind)).collect();
        let fields = [
            "kind",
            "metadata.name",
            "metadata.namespace",
            "metadata.annotations",
        ];

        match self.catalog.query_entities(&filters, &fields).await {
            Ok(entities) => {
                for entity in entities {
                    if !entity.has_annotations(&ANNOTATION_KEYS) {
                        continue;
                    }
                    self.cache
                        .insert(
                            EntityRef::of(&entity).to_string(),
                            github_annotations_of(&entity),
                        )
                        .await;
                }
            }
            Err(err) => {
                debug!("error while trying to get entities with github annotations: {err}");
            }
        }
    }

    fn organization_and_repository(
        &self,
        annotations: &BTreeMap<String, String>,
    ) -> Option<(String, String)> {
        for key in SOURCE_LOCATION_KEYS {
            if let Some(value) = annotations.get(key) {
                if let Some(captures) = self.source_location_regex.captures(value) {
                    return Some((self.config.org.clone(), captures[1].to_string()));
                }
            }
        }

        if let Some(slug) = annotations.get(PROJECT_SLUG) {
            if let Some((org, repo)) = slug.split_once('/') {
                if !org.is_empty() && !repo.is_empty() {
                    return Some((org.to_string(), repo.to_string()));
                }
            }
        }

        None
    }
}

/// The `github.com/*` subset of an entity's annotations.
fn github_annotations_of(entity: &Entity) -> BTreeMap<String, String> {
    entity
        .metadata
        .annotations
        .iter()
        .filter(|(key, _)| key.starts_with("github.com/"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[async_trait]
impl Intermediator for GithubAnnotationIntermediator {
    fn name(&self) -> &str {
        "github-annotation-intermediator"
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

        let entity_ref = EntityRef::of(entity).to_string();

        self.warm_cache().await;
        if let Some(previous) = self.cache.get(&entity_ref).await {
            debug!("entity {entity_ref} already has github annotations");
            entity.metadata.annotations.extend(previous);
            return Ok(());
        }

        let Some((org, repo)) = self.organization_and_repository(&entity.metadata.annotations)
        else {
            debug!(
                "no usable github source annotation found for entity {}",
                entity.metadata.name
            );
            return Ok(());
        };

        let details = match self.github.repo_details(&org, &repo).await {
            Ok(details) => details,
            Err(err) => {
                error!(
                    "error while trying to annotate entity {} with github data: {err}",
                    entity.metadata.name
                );
                return Ok(());
            }
        };

        let rule = details.default_branch_rule();
        let mut annotations = BTreeMap::new();
        if let Some(id) = details.database_id {
            annotations.insert(REPOSITORY_ID.to_string(), id.to_string());
        }
        if let Some(created_at) = &details.created_at {
            annotations.insert(REPOSITORY_CREATED_AT.to_string(), created_at.clone());
        }
        annotations.insert(PROJECT_SLUG.to_string(), format!("{org}/{repo}"));
        annotations.insert(
            BRANCH_PROTECTION_REQUIRED_APPROVALS.to_string(),
            rule.and_then(|r| r.required_approving_review_count)
                .unwrap_or(0)
                .to_string(),
        );
        annotations.insert(
            BRANCH_PROTECTION_REQUIRE_CODE_OWNER_REVIEWS.to_string(),
            rule.map(|r| r.requires_code_owner_reviews)
                .unwrap_or(false)
                .to_string(),
        );
        annotations.insert(BRANCH_PROTECTION_RULES.to_string(), rule.is_some().to_string());

        entity.metadata.annotations.extend(annotations.clone());
        self.cache.insert(entity_ref, annotations).await;

        Ok(())
    }
}

//! Concrete intermediators.
//!
//! Each one is independently best-effort: it enriches the entities it
//! recognizes and leaves everything else untouched.

mod cluster_identifier;
mod github_annotation;
mod infra_definition;
mod refresh_state;
mod template;

pub use cluster_identifier::{
    ApplicationCluster, ClusterIdentifierConfig, ClusterIdentifierIntermediator, ClusterLookup,
};
pub use github_annotation::{
    GithubAnnotationConfig, GithubAnnotationIntermediator, ANNOTATION_KEYS,
    BRANCH_PROTECTION_REQUIRED_APPROVALS, BRANCH_PROTECTION_REQUIRE_CODE_OWNER_REVIEWS,
    BRANCH_PROTECTION_RULES, PROJECT_SLUG, REPOSITORY_CREATED_AT, REPOSITORY_ID,
};
pub use infra_definition::{InfraDefinitionConfig, InfraDefinitionIntermediator};
pub use refresh_state::{RefreshStateConfig, RefreshStateIntermediator};
pub use template::{TemplateConfig, TemplateIntermediator};

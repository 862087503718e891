//! Entity enrichment pipeline for the Quay catalog.
//!
//! Entities discovered by the catalog flow through an ordered list of
//! *intermediators* — independently pluggable enrichment steps that mutate
//! an entity's metadata and spec before and after location resolution.
//!
//! # Components
//!
//! - **Contract**: [`Intermediator`] declares its hooks through an explicit
//!   [`Capability`] set; undeclared hooks are never invoked
//! - **Orchestrator**: [`EntityProcessor`] fans the hooks out in
//!   registration order and isolates failures per intermediator
//! - **Intermediators**: GitHub annotations, template image bundling,
//!   infrastructure chart definitions, refresh-state stamping, and cluster
//!   identification
//!
//! # Failure model
//!
//! No single intermediator failure aborts a pass: hook errors are logged
//! and the remaining intermediators still run against the entity as mutated
//! so far. Only [`EntityProcessor::validate_entity_kind`] fails closed — an
//! error or a `false` vote rejects the entity outright.

mod cache;
mod error;
mod github;
mod intermediator;
pub mod intermediators;
mod processor;

pub use cache::AnnotationCache;
pub use error::{EnrichmentError, EnrichmentResult};
pub use github::{GithubClient, GithubConfig, GraphqlGithubClient, ProtectionRule, RepoDetails};
pub use intermediator::{Capability, Emitter, Intermediator, ProcessorCache};
pub use processor::EntityProcessor;

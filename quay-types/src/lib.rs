//! Core type definitions for the Quay catalog.
//!
//! This crate defines the fundamental, enrichment-agnostic types used
//! throughout the catalog pipeline:
//! - [`Entity`] and [`EntityRef`] — the catalog record and its string identity
//! - [`LocationSpec`] — where an entity was discovered
//! - [`EventParams`] — the unit of delivery in the event broker
//! - [`ProcessingResult`] — what intermediators emit alongside an entity pass
//!
//! All enrichment-specific behavior (annotation writers, external clients)
//! belongs in `quay-enrichment`, not here.

mod entity;
mod event;
mod location;
mod refs;
mod relation;

pub use entity::{Entity, EntityMetadata, RefreshStateStamp};
pub use event::EventParams;
pub use location::LocationSpec;
pub use refs::{EntityRef, DEFAULT_NAMESPACE};
pub use relation::{
    EntityRelation, ProcessingResult, RELATION_DEPENDENCY_OF, RELATION_DEPENDS_ON,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid entity reference: {0}")]
    InvalidEntityRef(String),
}

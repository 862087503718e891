//! Error types for the enrichment pipeline.

use thiserror::Error;

/// Result type for enrichment operations.
pub type EnrichmentResult<T> = Result<T, EnrichmentError>;

/// Errors an intermediator hook can surface.
///
/// The orchestrator logs and swallows all of these; they matter to the
/// individual intermediator's control flow, not to the pass as a whole.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The entity fails a precondition the intermediator enforces.
    #[error("validation error: {0}")]
    Validation(String),

    /// Catalog or SCM access failed.
    #[error(transparent)]
    Catalog(#[from] quay_catalog::CatalogError),

    /// Direct HTTP failure (GitHub GraphQL).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The GitHub API answered but the response was unusable.
    #[error("github error: {0}")]
    Github(String),

    /// A file read kept failing after every allowed attempt.
    #[error("giving up on {path} after {attempts} attempts")]
    RetriesExhausted {
        /// The path that was being read.
        path: String,
        /// Attempts made.
        attempts: u32,
    },

    /// YAML parse or serialize failure.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

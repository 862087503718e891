//! Error types for catalog and SCM access.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur talking to the catalog or a source host.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected status {code} from {url}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// The URL that was requested.
        url: String,
    },

    /// The requested file or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Response body failed to decode.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CatalogError {
    /// Returns `true` for missing-resource errors, which callers treat as
    /// a definitive answer rather than a transient failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

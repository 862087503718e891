//! Error types for the broker.

use thiserror::Error;

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Errors that can occur in broker operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Configuration failed validation.
    #[error("invalid broker config: {0}")]
    InvalidConfig(String),

    /// A subscriber handler rejected an event.
    #[error("handler error: {0}")]
    Handler(String),

    /// The handler did not finish within the consume timeout.
    #[error("handler timed out")]
    Timeout,
}

//! Error types for model calls.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during model operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key in the configured environment variable.
    #[error("credentials not found: {0} is not set")]
    CredentialsNotFound(String),

    /// Provider API error.
    #[error("provider API error: {0}")]
    ProviderApi(String),

    /// Request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The call did not finish in time.
    #[error("model call timed out after {0} seconds")]
    Timeout(u64),

    /// The model answered with no text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

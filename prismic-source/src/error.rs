//! Error types for the sourcing layer.

use thiserror::Error;

/// Result type for sourcing operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur while talking to Prismic or to the host.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The access token was rejected (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The host rejected a node or cache operation.
    #[error("host error: {0}")]
    Host(String),

    /// The plugin options are unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<prismic_types::Error> for SourceError {
    fn from(e: prismic_types::Error) -> Self {
        match e {
            prismic_types::Error::Serialization(e) => SourceError::Serialization(e),
            other => SourceError::Config(other.to_string()),
        }
    }
}

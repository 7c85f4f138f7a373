//! Error types for the runtime.

use prismic_normalize::NormalizeError;
use thiserror::Error;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur in runtime operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A subscriber tried to mutate the runtime while being notified.
    #[error("runtime mutated from inside a subscriber")]
    Reentrant,

    /// Type path file could not be read.
    #[error("type paths error: {0}")]
    TypePaths(#[from] prismic_types::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Strict normalization failed.
    #[error("normalize error: {0}")]
    Normalize(#[from] NormalizeError),
}

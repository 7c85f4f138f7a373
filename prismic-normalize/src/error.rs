//! Error types for normalization.

use thiserror::Error;

/// Result type for normalization.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Errors raised while normalizing a single value.
///
/// Both variants are recoverable: [`crate::normalize_or_raw`] falls back to
/// the raw value so one odd field never fails a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// No type path is registered for the location.
    #[error("no type path registered for {path}")]
    MissingTypePath { path: String },

    /// The value does not have the shape its declared kind requires.
    #[error("expected {expected} at {path}")]
    ShapeMismatch { path: String, expected: &'static str },
}

impl NormalizeError {
    pub(crate) fn missing(path: &[String]) -> Self {
        Self::MissingTypePath { path: path.join(".") }
    }

    pub(crate) fn shape(path: &[String], expected: &'static str) -> Self {
        Self::ShapeMismatch {
            path: path.join("."),
            expected,
        }
    }
}

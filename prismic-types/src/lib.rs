//! Core type definitions for the Prismic normalization engine.
//!
//! This crate defines the fundamental, schema-agnostic types used throughout
//! the workspace:
//! - [`FieldKind`]: the closed set of field kinds a model can declare
//! - [`TypePath`] / [`TypePathSet`]: path → kind mappings derived from models
//! - [`NodeId`]: deterministic node identifiers (UUID v5)
//! - Content digests over canonical JSON
//!
//! Model parsing, normalization and the runtime registry live in their own
//! crates and only depend on the types here.

pub mod digest;
mod field_kind;
mod ids;
mod type_path;

pub use digest::{content_digest, sha256_hex, to_canonical_json_bytes};
pub use field_kind::FieldKind;
pub use ids::NodeId;
pub use type_path::{TypePath, TypePathSet};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid type path file: {0}")]
    InvalidTypePathFile(String),
}

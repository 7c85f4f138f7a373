//! Prismic model types and type path derivation.
//!
//! Defines the inputs of the normalization pipeline:
//! - [`CustomTypeModel`] / [`SharedSliceModel`]: the schema, as served by the
//!   Custom Types API
//! - [`RawDocument`]: a document as delivered by the content API
//! - [`FieldNameTransform`]: the field id → path segment mapping shared by the
//!   deriver and the normalizer
//! - [`derive_custom_type_type_paths`] / [`derive_shared_slice_type_paths`]:
//!   walk a model once and emit every `TypePath` it declares

mod derive;
mod document;
mod schema;
mod transform;

pub use derive::{derive_custom_type_type_paths, derive_shared_slice_type_paths};
pub use document::{AlternateLanguage, RawDocument};
pub use schema::{CustomTypeModel, FieldConfig, FieldModel, SharedSliceModel, SharedSliceVariationModel};
pub use transform::FieldNameTransform;

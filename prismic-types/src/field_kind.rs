//! Field kinds declared by Custom Type and Shared Slice models.
//!
//! The wire names are the ones Prismic uses in its model JSON (`"Slices"` for a
//! slice zone, `"UID"`, ...) plus a handful of synthetic kinds that only exist
//! in type paths (`"Document"`, `"DocumentData"`, `"SharedSliceVariation"`,
//! `"AlternateLanguages"`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a field at a given type path.
///
/// Unrecognized kinds are preserved verbatim in [`FieldKind::Unknown`] so a
/// newer Prismic field type degrades to a passthrough instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Boolean,
    Color,
    Date,
    Embed,
    GeoPoint,
    Image,
    IntegrationFields,
    Link,
    Number,
    Select,
    StructuredText,
    Text,
    Timestamp,
    Uid,
    Group,
    SliceZone,
    Slice,
    SharedSlice,
    SharedSliceVariation,
    Document,
    DocumentData,
    AlternateLanguages,
    Unknown(String),
}

impl FieldKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Boolean => "Boolean",
            FieldKind::Color => "Color",
            FieldKind::Date => "Date",
            FieldKind::Embed => "Embed",
            FieldKind::GeoPoint => "GeoPoint",
            FieldKind::Image => "Image",
            FieldKind::IntegrationFields => "IntegrationFields",
            FieldKind::Link => "Link",
            FieldKind::Number => "Number",
            FieldKind::Select => "Select",
            FieldKind::StructuredText => "StructuredText",
            FieldKind::Text => "Text",
            FieldKind::Timestamp => "Timestamp",
            FieldKind::Uid => "UID",
            FieldKind::Group => "Group",
            FieldKind::SliceZone => "Slices",
            FieldKind::Slice => "Slice",
            FieldKind::SharedSlice => "SharedSlice",
            FieldKind::SharedSliceVariation => "SharedSliceVariation",
            FieldKind::Document => "Document",
            FieldKind::DocumentData => "DocumentData",
            FieldKind::AlternateLanguages => "AlternateLanguages",
            FieldKind::Unknown(raw) => raw,
        }
    }

    /// Whether values of this kind pass through normalization untouched.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            FieldKind::Boolean
                | FieldKind::Color
                | FieldKind::Date
                | FieldKind::GeoPoint
                | FieldKind::Number
                | FieldKind::Select
                | FieldKind::Text
                | FieldKind::Timestamp
                | FieldKind::Uid
        )
    }
}

impl From<&str> for FieldKind {
    fn from(raw: &str) -> Self {
        match raw {
            "Boolean" => FieldKind::Boolean,
            "Color" => FieldKind::Color,
            "Date" => FieldKind::Date,
            "Embed" => FieldKind::Embed,
            "GeoPoint" => FieldKind::GeoPoint,
            "Image" => FieldKind::Image,
            "IntegrationFields" => FieldKind::IntegrationFields,
            "Link" => FieldKind::Link,
            "Number" => FieldKind::Number,
            "Select" => FieldKind::Select,
            // Prismic still emits the legacy "StructuredText" name for both
            // Title and Rich Text fields.
            "StructuredText" | "RichText" => FieldKind::StructuredText,
            "Text" => FieldKind::Text,
            "Timestamp" => FieldKind::Timestamp,
            "UID" => FieldKind::Uid,
            "Group" => FieldKind::Group,
            "Slices" => FieldKind::SliceZone,
            "Slice" => FieldKind::Slice,
            "SharedSlice" => FieldKind::SharedSlice,
            "SharedSliceVariation" => FieldKind::SharedSliceVariation,
            "Document" => FieldKind::Document,
            "DocumentData" => FieldKind::DocumentData,
            "AlternateLanguages" => FieldKind::AlternateLanguages,
            other => FieldKind::Unknown(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(raw: String) -> Self {
        FieldKind::from(raw.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

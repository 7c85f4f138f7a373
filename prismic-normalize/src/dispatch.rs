//! Kind dispatch.
//!
//! Every location is normalized by looking its path up in the type path
//! registry and calling the normalizer for the registered kind. Container
//! kinds recurse with the child path, so a document is normalized by one call
//! at `[custom_type_id]`.

use crate::deps::NormalizeDeps;
use crate::error::{NormalizeError, NormalizeResult};
use crate::image::normalize_image;
use crate::link::normalize_link;
use crate::naming::document_type_name;
use crate::node::{embed_node, integration_node};
use crate::structured_text::normalize_structured_text;
use prismic_model::RawDocument;
use prismic_types::{content_digest, FieldKind, NodeId};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

/// Normalizes `value` found at `path`.
///
/// Fails when no type path is registered for `path` or when the value does
/// not have the shape its kind requires. Nested failures never surface here:
/// children are normalized with [`normalize_or_raw`].
pub fn normalize(path: &[String], value: &Value, deps: &NormalizeDeps<'_>) -> NormalizeResult<Value> {
    let kind = deps
        .type_paths
        .get_type_path(path)
        .ok_or_else(|| NormalizeError::missing(path))?;

    match kind {
        FieldKind::Document => document(path, value, deps),
        FieldKind::DocumentData => {
            let fields = object(path, value)?;
            Ok(Value::Object(normalize_fields(path, fields, deps)))
        }
        FieldKind::Group => group(path, value, deps),
        FieldKind::SliceZone => slice_zone(path, value, deps),
        FieldKind::Slice | FieldKind::SharedSliceVariation => slice(path, value, deps),
        FieldKind::Link => normalize_link(path, value, deps),
        FieldKind::Image => normalize_image(path, value, deps),
        FieldKind::StructuredText => normalize_structured_text(path, value, deps),
        FieldKind::Embed => match value {
            Value::Null => Ok(Value::Null),
            Value::Object(fields) => Ok(embed_node(fields, deps)),
            _ => Err(NormalizeError::shape(path, "an embed object")),
        },
        FieldKind::IntegrationFields => match value {
            Value::Null => Ok(Value::Null),
            Value::Object(fields) => Ok(integration_node(path, fields, deps)),
            _ => Err(NormalizeError::shape(path, "an integration fields object")),
        },
        FieldKind::AlternateLanguages => alternate_languages(path, value, deps),
        FieldKind::Boolean
        | FieldKind::Color
        | FieldKind::Date
        | FieldKind::GeoPoint
        | FieldKind::Number
        | FieldKind::Select
        | FieldKind::Text
        | FieldKind::Timestamp
        | FieldKind::Uid
        | FieldKind::SharedSlice => Ok(value.clone()),
        FieldKind::Unknown(raw) => {
            warn!(kind = %raw, path = %path.join("."), "field type unknown, using fallback");
            Ok(value.clone())
        }
    }
}

/// Normalizes `value`, falling back to the raw value on any error.
pub fn normalize_or_raw(path: &[String], value: &Value, deps: &NormalizeDeps<'_>) -> Value {
    match normalize(path, value, deps) {
        Ok(normalized) => normalized,
        Err(e) => {
            info!("Keeping raw value: {}", e);
            value.clone()
        }
    }
}

/// Normalizes a whole document.
///
/// Documents of a type with no registered model come back raw.
pub fn normalize_document(document: &RawDocument, deps: &NormalizeDeps<'_>) -> Value {
    let path = [document.document_type.clone()];
    normalize_or_raw(&path, &document.to_value(), deps)
}

fn object<'v>(path: &[String], value: &'v Value) -> NormalizeResult<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| NormalizeError::shape(path, "an object"))
}

fn child(path: &[String], segment: impl Into<String>) -> Vec<String> {
    let mut next = Vec::with_capacity(path.len() + 1);
    next.extend_from_slice(path);
    next.push(segment.into());
    next
}

/// Normalizes each property under `[...path, transformed_key]`; the output
/// uses the transformed keys.
fn normalize_fields(
    path: &[String],
    fields: &Map<String, Value>,
    deps: &NormalizeDeps<'_>,
) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| {
            let segment = deps.field_segment(key);
            let normalized = normalize_or_raw(&child(path, segment.as_str()), value, deps);
            (segment, normalized)
        })
        .collect()
}

fn document(path: &[String], value: &Value, deps: &NormalizeDeps<'_>) -> NormalizeResult<Value> {
    let fields = object(path, value)?;
    let prismic_id = fields
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| NormalizeError::shape(path, "a document with an id"))?;
    let document_type = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| NormalizeError::shape(path, "a document with a type"))?;

    // Top-level keys are Prismic's own and are never renamed. Only `data` and
    // `alternate_languages` have type paths; metadata is copied through.
    let mut out: Map<String, Value> = fields
        .iter()
        .map(|(key, field)| {
            let normalized = match key.as_str() {
                "data" | "alternate_languages" => {
                    normalize_or_raw(&child(path, key.as_str()), field, deps)
                }
                _ => field.clone(),
            };
            (key.clone(), normalized)
        })
        .collect();
    out.insert("prismicId".into(), json!(prismic_id));
    out.insert("_previewable".into(), json!(prismic_id));
    out.insert(
        "id".into(),
        json!(NodeId::for_document(document_type, prismic_id).to_string()),
    );
    out.insert(
        "url".into(),
        deps.options
            .resolve_link(value)
            .map_or(Value::Null, Value::String),
    );
    out.insert(
        "dataRaw".into(),
        fields.get("data").cloned().unwrap_or(Value::Null),
    );
    out.insert(
        "internal".into(),
        json!({
            "type": document_type_name(deps.options.type_prefix.as_deref(), document_type),
            "contentDigest": content_digest(value),
        }),
    );

    Ok(Value::Object(out))
}

fn group(path: &[String], value: &Value, deps: &NormalizeDeps<'_>) -> NormalizeResult<Value> {
    let Value::Array(rows) = value else {
        return Err(NormalizeError::shape(path, "an array of group rows"));
    };

    rows.iter()
        .map(|row| {
            let fields = row
                .as_object()
                .ok_or_else(|| NormalizeError::shape(path, "an array of group rows"))?;
            Ok(Value::Object(normalize_fields(path, fields, deps)))
        })
        .collect::<NormalizeResult<Vec<_>>>()
        .map(Value::Array)
}

fn slice_zone(path: &[String], value: &Value, deps: &NormalizeDeps<'_>) -> NormalizeResult<Value> {
    let Value::Array(slices) = value else {
        return Err(NormalizeError::shape(path, "an array of slices"));
    };

    slices
        .iter()
        .map(|slice| {
            let slice_type = slice
                .get("slice_type")
                .and_then(Value::as_str)
                .ok_or_else(|| NormalizeError::shape(path, "an array of slices"))?;

            // Shared slices carry their variation and are addressed by their
            // own model, not by the zone they appear in.
            let slice_path = match slice.get("variation").and_then(Value::as_str) {
                Some(variation) => vec![slice_type.to_string(), variation.to_string()],
                None => child(path, slice_type),
            };
            Ok(normalize_or_raw(&slice_path, slice, deps))
        })
        .collect::<NormalizeResult<Vec<_>>>()
        .map(Value::Array)
}

fn slice(path: &[String], value: &Value, deps: &NormalizeDeps<'_>) -> NormalizeResult<Value> {
    let fields = object(path, value)?;
    if !fields.get("slice_type").is_some_and(Value::is_string) {
        return Err(NormalizeError::shape(path, "a slice with a slice_type"));
    }

    let primary = match fields.get("primary") {
        Some(Value::Object(primary)) => normalize_fields(&child(path, "primary"), primary, deps),
        _ => Map::new(),
    };

    let items_path = child(path, "items");
    let items: Vec<Value> = match fields.get("items") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(item) => Value::Object(normalize_fields(&items_path, item, deps)),
                other => other.clone(),
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut out = fields.clone();
    out.insert("primary".into(), Value::Object(primary));
    out.insert("items".into(), Value::Array(items));
    out.insert(
        "id".into(),
        json!(NodeId::from_seed(&format!("{} {}", path.join("."), content_digest(value))).to_string()),
    );
    Ok(Value::Object(out))
}

fn alternate_languages(
    path: &[String],
    value: &Value,
    deps: &NormalizeDeps<'_>,
) -> NormalizeResult<Value> {
    let Value::Array(languages) = value else {
        return Err(NormalizeError::shape(path, "an array of alternate languages"));
    };

    languages
        .iter()
        .map(|language| {
            let Value::Object(fields) = language else {
                return Err(NormalizeError::shape(path, "an array of alternate languages"));
            };
            let mut link = fields.clone();
            link.insert("link_type".into(), json!("Document"));
            normalize_link(path, &Value::Object(link), deps)
        })
        .collect::<NormalizeResult<Vec<_>>>()
        .map(Value::Array)
}

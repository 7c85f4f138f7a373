//! Preview merge.
//!
//! Pages are built with static data queried ahead of time. During a preview
//! the edited document is fetched live and merged over that data so the page
//! renders the draft without a rebuild.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// How preview data is merged into static data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Deep merge when the preview's top-level key is present in the static
    /// data (the page queried the previewed type directly), traverse and
    /// replace otherwise.
    #[default]
    Auto,
    /// Objects merge key by key; arrays and scalars from the preview replace
    /// the static value.
    DeepMerge,
    /// Every static object that is the previewed document is replaced by
    /// `{...static, ...preview}`; everything else is untouched.
    TraverseAndReplace,
}

/// Merges `preview` into `static_data`.
///
/// `preview` is the previewed document keyed by its query field, e.g.
/// `{"prismicPage": {...}}`.
pub fn merge_preview_data(static_data: &Value, preview: &Value, strategy: MergeStrategy) -> Value {
    let strategy = match strategy {
        MergeStrategy::Auto if shares_top_level_key(static_data, preview) => MergeStrategy::DeepMerge,
        MergeStrategy::Auto => MergeStrategy::TraverseAndReplace,
        explicit => explicit,
    };
    debug!("Merging preview data with {:?}", strategy);

    match strategy {
        MergeStrategy::TraverseAndReplace => match preview_document(preview) {
            Some(document) => traverse_and_replace(static_data, document),
            None => static_data.clone(),
        },
        _ => deep_merge(static_data, preview),
    }
}

fn shares_top_level_key(static_data: &Value, preview: &Value) -> bool {
    match (static_data, preview) {
        (Value::Object(static_data), Value::Object(preview)) => {
            preview.keys().any(|key| static_data.contains_key(key))
        }
        _ => false,
    }
}

fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            let mut merged = base.clone();
            for (key, value) in overlay {
                let next = match base.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

/// The document inside a `{queryField: document}` payload, or the payload
/// itself when it is already a document.
fn preview_document(preview: &Value) -> Option<&Map<String, Value>> {
    let object = preview.as_object()?;
    if identity(object).is_some() {
        return Some(object);
    }
    match object.values().next() {
        Some(Value::Object(document)) if object.len() == 1 => Some(document),
        _ => None,
    }
}

/// `_previewable` when present, `id` otherwise.
fn identity(object: &Map<String, Value>) -> Option<&Value> {
    object.get("_previewable").or_else(|| object.get("id"))
}

fn traverse_and_replace(value: &Value, document: &Map<String, Value>) -> Value {
    let Some(target) = identity(document) else {
        return value.clone();
    };

    match value {
        Value::Object(object) if identity(object) == Some(target) => {
            let mut replaced = object.clone();
            for (key, field) in document {
                replaced.insert(key.clone(), field.clone());
            }
            Value::Object(replaced)
        }
        Value::Object(object) => Value::Object(
            object
                .iter()
                .map(|(key, field)| (key.clone(), traverse_and_replace(field, document)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| traverse_and_replace(item, document))
                .collect(),
        ),
        other => other.clone(),
    }
}

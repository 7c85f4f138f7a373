//! Synthetic nodes and file references.

use crate::deps::{DownloadRequest, NormalizeDeps};
use crate::naming::type_name;
use prismic_types::{content_digest, NodeId};
use serde_json::{json, Map, Value};
use tracing::debug;

/// `localFile` of a Media link or image: the file node id when the download
/// predicate accepts the field, `null` otherwise.
pub(crate) fn local_file(path: &[String], url: &str, field: &Value, deps: &NormalizeDeps<'_>) -> Value {
    if !deps.options.should_download_files.should_download(path, field) {
        return Value::Null;
    }

    let request = DownloadRequest::new(url, path);
    let node_id = request.node_id.to_string();
    debug!("Requesting download of {} for {}", request.url, request.field_path);
    deps.sink.request_download(request);
    Value::String(node_id)
}

/// Wraps an Embed field into a synthetic node and returns its id.
///
/// The node id is seeded by `embed_url`, or by the content digest when the
/// embed has none. An empty embed yields `null` and no node.
pub(crate) fn embed_node(fields: &Map<String, Value>, deps: &NormalizeDeps<'_>) -> Value {
    if fields.is_empty() {
        return Value::Null;
    }
    let type_name = type_name(deps.options.type_prefix.as_deref(), ["embed", "type"]);
    let seed = fields
        .get("embed_url")
        .and_then(Value::as_str)
        .map(str::to_string);
    synthetic_node(fields, type_name, seed, deps)
}

/// Wraps an IntegrationFields value into a synthetic node and returns its id.
///
/// Each integration field gets its own node type named after its path, since
/// integrations of different catalogs share nothing but the field kind.
pub(crate) fn integration_node(
    path: &[String],
    fields: &Map<String, Value>,
    deps: &NormalizeDeps<'_>,
) -> Value {
    let type_name = type_name(
        deps.options.type_prefix.as_deref(),
        path.iter().map(String::as_str).chain(["integration", "type"]),
    );
    let seed = match fields.get("id") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    };
    synthetic_node(fields, type_name, seed, deps)
}

fn synthetic_node(
    fields: &Map<String, Value>,
    type_name: String,
    seed: Option<String>,
    deps: &NormalizeDeps<'_>,
) -> Value {
    let raw = Value::Object(fields.clone());
    let digest = content_digest(&raw);
    let seed = seed.unwrap_or_else(|| digest.clone());
    let id = NodeId::from_seed(&format!("{type_name} {seed}")).to_string();

    let mut node = fields.clone();
    if let Some(prismic_id) = fields.get("id") {
        node.insert("prismicId".into(), prismic_id.clone());
    }
    node.insert("id".into(), Value::String(id.clone()));
    node.insert(
        "internal".into(),
        json!({"type": type_name, "contentDigest": digest}),
    );
    deps.sink.create_node(Value::Object(node));

    Value::String(id)
}

use crate::deps::NormalizeDeps;
use crate::error::{NormalizeError, NormalizeResult};
use crate::node::local_file;
use crate::options::LinkedDocuments;
use prismic_types::NodeId;
use serde_json::{Map, Value};

/// Normalizes a Link field.
///
/// The raw link is kept and extended with `url`, `raw` and `document`; Media
/// links with a URL also get `localFile`. `document` is resolved against the
/// registry as it stands now, so a target registered later shows up only
/// after the link is normalized again. The embedded target's own links carry
/// a `null` document.
pub(crate) fn normalize_link(
    path: &[String],
    value: &Value,
    deps: &NormalizeDeps<'_>,
) -> NormalizeResult<Value> {
    let Value::Object(link) = value else {
        return Err(NormalizeError::shape(path, "a link object"));
    };

    let link_type = link.get("link_type").and_then(Value::as_str).unwrap_or("Any");
    let is_broken = link.get("isBroken").and_then(Value::as_bool).unwrap_or(false);
    let raw_url = link.get("url").and_then(Value::as_str);

    let url = match link_type {
        "Document" if !is_broken => deps.options.resolve_link(value),
        "Web" | "Media" => raw_url.map(str::to_string),
        _ => None,
    };

    let mut out = link.clone();
    out.insert("url".into(), url.map_or(Value::Null, Value::String));
    out.insert("raw".into(), value.clone());
    out.insert("document".into(), linked_document(link, link_type, is_broken, deps));

    if link_type == "Media" {
        if let Some(raw_url) = raw_url {
            out.insert("localFile".into(), local_file(path, raw_url, value, deps));
        }
    }

    Ok(Value::Object(out))
}

fn linked_document(
    link: &Map<String, Value>,
    link_type: &str,
    is_broken: bool,
    deps: &NormalizeDeps<'_>,
) -> Value {
    if link_type != "Document" || is_broken {
        return Value::Null;
    }
    let Some(id) = link.get("id").and_then(Value::as_str) else {
        return Value::Null;
    };

    match deps.options.linked_documents {
        LinkedDocuments::Embed => match deps.nodes.get_node(id) {
            Some(mut document) => {
                detach_linked_documents(&mut document);
                document
            }
            None => Value::Null,
        },
        LinkedDocuments::NodeId => match link.get("type").and_then(Value::as_str) {
            Some(document_type) => Value::String(NodeId::for_document(document_type, id).to_string()),
            None => Value::Null,
        },
    }
}

/// Clears `document` on every normalized link inside an embedded document,
/// so a link embeds its target one level deep.
fn detach_linked_documents(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let is_link = map.contains_key("link_type") && map.contains_key("raw");
            if is_link && map.contains_key("document") {
                map.insert("document".into(), Value::Null);
            }
            map.values_mut().for_each(detach_linked_documents);
        }
        Value::Array(items) => items.iter_mut().for_each(detach_linked_documents),
        _ => {}
    }
}

use pretty_assertions::assert_eq;
use prismic_source::host::{document_node_ids, find_document_node};
use prismic_source::{MemoryHost, NodeHost, SourceError};
use prismic_types::{content_digest, NodeId};
use serde_json::json;

fn node(id: &str, node_type: &str) -> serde_json::Value {
    json!({"id": id, "internal": {"type": node_type, "contentDigest": "d"}})
}

// ── Nodes ───────────────────────────────────────────────────────

#[test]
fn create_and_get_node() {
    let host = MemoryHost::new();
    host.create_node(node("n1", "PrismicPage")).unwrap();

    assert_eq!(host.len(), 1);
    assert_eq!(host.get_node("n1").unwrap()["internal"]["type"], "PrismicPage");
    assert!(host.get_node("n2").is_none());
}

#[test]
fn create_replaces_same_id() {
    let host = MemoryHost::new();
    host.create_node(node("n1", "PrismicPage")).unwrap();
    host.create_node(node("n1", "PrismicPost")).unwrap();

    assert_eq!(host.len(), 1);
    assert_eq!(host.get_node("n1").unwrap()["internal"]["type"], "PrismicPost");
}

#[test]
fn node_without_id_or_type_is_rejected() {
    let host = MemoryHost::new();
    assert!(matches!(
        host.create_node(json!({"internal": {"type": "X"}})),
        Err(SourceError::Host(_))
    ));
    assert!(matches!(host.create_node(json!({"id": "n1"})), Err(SourceError::Host(_))));
    assert!(host.is_empty());
}

#[test]
fn delete_reports_existence() {
    let host = MemoryHost::new();
    host.create_node(node("n1", "PrismicPage")).unwrap();

    assert!(host.delete_node("n1"));
    assert!(!host.delete_node("n1"));
    assert!(host.is_empty());
}

#[test]
fn nodes_of_type_filters() {
    let host = MemoryHost::new();
    host.create_node(node("n1", "PrismicPage")).unwrap();
    host.create_node(node("n2", "File")).unwrap();

    let files = host.nodes_of_type("File");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["id"], "n2");
}

// ── Builds ──────────────────────────────────────────────────────

#[test]
fn sweep_removes_untouched_nodes() {
    let host = MemoryHost::new();
    host.create_node(node("kept", "PrismicPage")).unwrap();
    host.create_node(node("stale", "PrismicPage")).unwrap();

    host.begin_build();
    host.touch_node("kept");
    host.touch_node("missing");

    assert_eq!(host.sweep(), 1);
    assert!(host.get_node("kept").is_some());
    assert!(host.get_node("stale").is_none());
    assert!(!host.is_touched("missing"));
}

#[test]
fn created_nodes_count_as_touched() {
    let host = MemoryHost::new();
    host.begin_build();
    host.create_node(node("n1", "PrismicPage")).unwrap();
    assert!(host.is_touched("n1"));
    assert_eq!(host.sweep(), 0);
}

// ── Cache and helpers ───────────────────────────────────────────

#[test]
fn cache_round_trips_values() {
    let host = MemoryHost::new();
    assert!(host.cache_get("k").is_none());
    host.cache_set("k", json!({"a": 1}));
    assert_eq!(host.cache_get("k"), Some(json!({"a": 1})));
}

#[test]
fn default_id_and_digest_helpers() {
    let host = MemoryHost::new();
    assert_eq!(host.create_node_id("page X"), NodeId::from_seed("page X").to_string());
    let value = json!({"b": 1, "a": 2});
    assert_eq!(host.create_content_digest(&value), content_digest(&value));
}

#[test]
fn document_nodes_are_found_by_prismic_id() {
    let host = MemoryHost::new();
    host.create_node(json!({
        "id": "doc-node",
        "prismicId": "XyZ",
        "dataRaw": {},
        "internal": {"type": "PrismicPage"}
    }))
    .unwrap();
    // Integration nodes carry a prismicId but are not documents.
    host.create_node(json!({
        "id": "integration-node",
        "prismicId": "XyZ",
        "internal": {"type": "PrismicPageDataShopIntegrationType"}
    }))
    .unwrap();

    assert_eq!(document_node_ids(&host), vec!["doc-node"]);
    assert_eq!(find_document_node(&host, "XyZ").unwrap()["id"], "doc-node");
    assert!(find_document_node(&host, "other").is_none());
}

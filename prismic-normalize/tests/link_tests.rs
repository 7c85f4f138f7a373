use pretty_assertions::assert_eq;
use prismic_normalize::{
    normalize, CollectingSink, DownloadRule, LinkedDocuments, NodeLookup, NormalizeDeps,
    NormalizeOptions, NullSink, ShouldDownloadFiles,
};
use prismic_types::{FieldKind, NodeId, TypePath, TypePathSet};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};

struct Nodes(HashMap<String, Value>);

impl NodeLookup for Nodes {
    fn get_node(&self, prismic_id: &str) -> Option<Value> {
        self.0.get(prismic_id).cloned()
    }
}

fn link_path() -> Vec<String> {
    vec!["page".into(), "data".into(), "link".into()]
}

fn type_paths() -> TypePathSet {
    [TypePath::new(link_path(), FieldKind::Link)].into_iter().collect()
}

fn nodes() -> Nodes {
    Nodes(HashMap::from([(
        "target".to_string(),
        json!({"prismicId": "target", "uid": "about"}),
    )]))
}

fn document_link() -> Value {
    json!({
        "link_type": "Document",
        "id": "target",
        "uid": "about",
        "type": "page",
        "lang": "en-us",
        "isBroken": false
    })
}

fn media_link() -> Value {
    json!({
        "link_type": "Media",
        "name": "report.pdf",
        "kind": "document",
        "url": "https://prismic-io.s3.amazonaws.com/repo/report.pdf",
        "size": "1024"
    })
}

fn resolver_options() -> NormalizeOptions {
    NormalizeOptions::default().with_link_resolver(|link| Some(format!("/{}", link.get("uid")?.as_str()?)))
}

// ── Document links ───────────────────────────────────────────────

#[test]
fn document_link_resolves_url_and_document() {
    let paths = type_paths();
    let nodes = nodes();
    let options = resolver_options();
    let deps = NormalizeDeps::new(&paths, &nodes, &NullSink, &options);

    let out = normalize(&link_path(), &document_link(), &deps).unwrap();

    assert_eq!(out["url"], "/about");
    assert_eq!(out["document"]["prismicId"], "target");
    assert_eq!(out["raw"], document_link());
    assert_eq!(out["uid"], "about");
}

#[test]
fn broken_link_has_no_document() {
    let paths = type_paths();
    let nodes = nodes();
    let options = resolver_options();
    let deps = NormalizeDeps::new(&paths, &nodes, &NullSink, &options);

    let mut link = document_link();
    link["isBroken"] = json!(true);
    let out = normalize(&link_path(), &link, &deps).unwrap();

    assert_eq!(out["document"], Value::Null);
    assert_eq!(out["url"], Value::Null);
}

#[test]
fn unregistered_target_is_null() {
    let paths = type_paths();
    let options = resolver_options();
    let deps = NormalizeDeps::new(&paths, &(), &NullSink, &options);

    let out = normalize(&link_path(), &document_link(), &deps).unwrap();
    assert_eq!(out["document"], Value::Null);
    assert_eq!(out["url"], "/about");
}

#[test]
fn document_link_without_resolver_has_null_url() {
    let paths = type_paths();
    let nodes = nodes();
    let options = NormalizeOptions::default();
    let deps = NormalizeDeps::new(&paths, &nodes, &NullSink, &options);

    let out = normalize(&link_path(), &document_link(), &deps).unwrap();
    assert_eq!(out["url"], Value::Null);
    assert_eq!(out["document"]["uid"], "about");
}

#[test]
fn node_id_mode_references_the_target_node() {
    let paths = type_paths();
    let options = NormalizeOptions {
        linked_documents: LinkedDocuments::NodeId,
        ..NormalizeOptions::default()
    };
    let deps = NormalizeDeps::new(&paths, &(), &NullSink, &options);

    let out = normalize(&link_path(), &document_link(), &deps).unwrap();
    assert_eq!(out["document"], NodeId::for_document("page", "target").to_string());
}

// ── Web and empty links ──────────────────────────────────────────

#[test]
fn web_link_uses_its_url() {
    let paths = type_paths();
    let options = resolver_options();
    let deps = NormalizeDeps::new(&paths, &(), &NullSink, &options);

    let link = json!({"link_type": "Web", "url": "https://prismic.io", "target": "_blank"});
    let out = normalize(&link_path(), &link, &deps).unwrap();

    assert_eq!(out["url"], "https://prismic.io");
    assert_eq!(out["target"], "_blank");
    assert_eq!(out["document"], Value::Null);
    assert!(out.get("localFile").is_none());
}

#[test]
fn empty_link_is_all_null() {
    let paths = type_paths();
    let options = resolver_options();
    let deps = NormalizeDeps::new(&paths, &(), &NullSink, &options);

    let out = normalize(&link_path(), &json!({"link_type": "Any"}), &deps).unwrap();
    assert_eq!(out["url"], Value::Null);
    assert_eq!(out["document"], Value::Null);
    assert_eq!(out["raw"], json!({"link_type": "Any"}));
}

// ── Media links and downloads ────────────────────────────────────

#[test]
fn media_link_is_not_downloaded_by_default() {
    let paths = type_paths();
    let options = NormalizeOptions::default();
    let sink = CollectingSink::new();
    let deps = NormalizeDeps::new(&paths, &(), &sink, &options);

    let out = normalize(&link_path(), &media_link(), &deps).unwrap();

    assert_eq!(out["url"], media_link()["url"]);
    assert_eq!(out["localFile"], Value::Null);
    assert!(sink.take_downloads().is_empty());
}

#[test]
fn downloaded_media_link_references_file_node() {
    let paths = type_paths();
    let options = NormalizeOptions {
        should_download_files: ShouldDownloadFiles::Bool(true),
        ..NormalizeOptions::default()
    };
    let sink = CollectingSink::new();
    let deps = NormalizeDeps::new(&paths, &(), &sink, &options);

    let out = normalize(&link_path(), &media_link(), &deps).unwrap();

    let url = "https://prismic-io.s3.amazonaws.com/repo/report.pdf";
    assert_eq!(out["localFile"], NodeId::for_remote_file(url).to_string());

    let downloads = sink.take_downloads();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].url, url);
    assert_eq!(downloads[0].field_path, "page.data.link");
    assert_eq!(downloads[0].cache_key(), format!("file-node-{url}"));
}

#[test]
fn download_table_matches_dotted_path() {
    let paths = type_paths();
    let sink = CollectingSink::new();

    let on = NormalizeOptions {
        should_download_files: ShouldDownloadFiles::Table(BTreeMap::from([(
            "page.data.link".to_string(),
            DownloadRule::Bool(true),
        )])),
        ..NormalizeOptions::default()
    };
    let deps = NormalizeDeps::new(&paths, &(), &sink, &on);
    assert!(normalize(&link_path(), &media_link(), &deps).unwrap()["localFile"].is_string());

    let other = NormalizeOptions {
        should_download_files: ShouldDownloadFiles::Table(BTreeMap::from([(
            "page.data.other".to_string(),
            DownloadRule::Bool(true),
        )])),
        ..NormalizeOptions::default()
    };
    let deps = NormalizeDeps::new(&paths, &(), &sink, &other);
    assert!(normalize(&link_path(), &media_link(), &deps).unwrap()["localFile"].is_null());
}

#[test]
fn download_function_receives_path_and_field() {
    let predicate = ShouldDownloadFiles::function(|path, field| {
        path.last().map(String::as_str) == Some("link") && field["name"] == "report.pdf"
    });
    assert!(predicate.should_download(&link_path(), &media_link()));
    assert!(!predicate.should_download(&link_path(), &json!({"name": "other.pdf"})));
}

#[test]
fn download_table_entries_can_be_functions() {
    let table = ShouldDownloadFiles::Table(BTreeMap::from([(
        "page.data.link".to_string(),
        DownloadRule::Function(std::sync::Arc::new(|_: &[String], field: &Value| field["size"] == "1024")),
    )]));
    assert!(table.should_download(&link_path(), &media_link()));
    assert!(!table.should_download(&link_path(), &json!({"size": "1"})));
}

#[test]
fn download_setting_deserializes_from_bool_or_table() {
    let on: ShouldDownloadFiles = serde_json::from_value(json!(true)).unwrap();
    assert!(on.should_download(&link_path(), &media_link()));

    let table: ShouldDownloadFiles =
        serde_json::from_value(json!({"page.data.link": true, "page.data.image": false})).unwrap();
    assert!(table.should_download(&link_path(), &media_link()));
    assert!(!table.should_download(&["page".into(), "data".into(), "image".into()], &json!({})));
}

use pretty_assertions::assert_eq;
use prismic_source::api::{id_predicate, ids_predicate};
use prismic_source::{ClientConfig, ContentApi, PluginOptions, PrismicClient, SourceError};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PrismicClient {
    let options = PluginOptions {
        api_endpoint: Some(format!("{}/api/v2", server.uri())),
        ..PluginOptions::new("my-repo")
    };
    PrismicClient::from_options(&options).unwrap()
}

fn document(id: &str) -> Value {
    json!({
        "id": id,
        "uid": id,
        "type": "page",
        "lang": "en-us",
        "tags": [],
        "alternate_languages": [],
        "data": {"title": []}
    })
}

fn page(page: u32, total_pages: u32, ids: &[&str]) -> Value {
    json!({
        "page": page,
        "total_pages": total_pages,
        "results_per_page": 100,
        "results": ids.iter().map(|id| document(id)).collect::<Vec<_>>()
    })
}

fn metadata() -> Value {
    json!({
        "refs": [
            {"id": "master", "ref": "master-ref", "label": "Master", "isMasterRef": true},
            {"id": "spring", "ref": "spring-ref", "label": "Spring sale"}
        ],
        "types": {"page": "Page"}
    })
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn client_config_from_options() {
    let options = PluginOptions {
        access_token: Some("secret".to_string()),
        fetch_links: vec!["author.name".to_string()],
        ..PluginOptions::new("my-repo")
    };
    let config = ClientConfig::from(&options);
    assert_eq!(config.endpoint, "https://my-repo.cdn.prismic.io/api/v2");
    assert_eq!(config.access_token.as_deref(), Some("secret"));
    assert_eq!(config.lang, "*");
    assert_eq!(config.fetch_links, vec!["author.name"]);
}

#[test]
fn client_requires_repository_name() {
    let result = PrismicClient::from_options(&PluginOptions::default());
    assert!(matches!(result, Err(SourceError::Config(_))));
}

#[test]
fn predicates_quote_ids() {
    assert_eq!(
        ids_predicate(&["a".to_string(), "b".to_string()]),
        r#"[[in(document.id, ["a","b"])]]"#
    );
    assert_eq!(id_predicate("XyZ"), r#"[[at(document.id, "XyZ")]]"#);
}

// ── Repository metadata ─────────────────────────────────────────

#[tokio::test]
async fn repository_metadata_lists_refs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata()))
        .mount(&server)
        .await;

    let metadata = client_for(&server).get_repository_metadata().await.unwrap();
    assert_eq!(metadata.refs.len(), 2);
    assert_eq!(metadata.master_ref().unwrap().reference, "master-ref");
    assert_eq!(metadata.select_ref(Some("spring")).unwrap().reference, "spring-ref");
    assert!(matches!(
        metadata.select_ref(Some("winter")),
        Err(SourceError::Config(_))
    ));
}

#[tokio::test]
async fn unauthorized_is_distinct() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid access token"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_repository_metadata().await.unwrap_err();
    match err {
        SourceError::Unauthorized(message) => assert_eq!(message, "Invalid access token"),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).get_repository_metadata().await.unwrap_err();
    assert!(matches!(err, SourceError::Api { status: 503, .. }));
}

// ── Pagination ──────────────────────────────────────────────────

#[tokio::test]
async fn query_all_documents_follows_every_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("ref", "master-ref"))
        .and(query_param("pageSize", "100"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 3, &["a", "b"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(2, 3, &["c"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(3, 3, &["d"])))
        .expect(1)
        .mount(&server)
        .await;

    let documents = client_for(&server).query_all_documents("master-ref").await.unwrap();
    let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);
    assert_eq!(documents[0].document_type, "page");
}

#[tokio::test]
async fn empty_repository_yields_no_documents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 0, &[])))
        .expect(1)
        .mount(&server)
        .await;

    let documents = client_for(&server).query_all_documents("master-ref").await.unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn failed_page_fails_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 2, &["a"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server).query_all_documents("master-ref").await.unwrap_err();
    assert!(matches!(err, SourceError::Api { status: 500, .. }));
}

#[tokio::test]
async fn search_sends_configured_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("lang", "fr-fr"))
        .and(query_param("access_token", "secret"))
        .and(query_param("fetchLinks", "author.name,author.avatar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 1, &["a"])))
        .expect(1)
        .mount(&server)
        .await;

    let options = PluginOptions {
        api_endpoint: Some(format!("{}/api/v2/", server.uri())),
        access_token: Some("secret".to_string()),
        lang: "fr-fr".to_string(),
        fetch_links: vec!["author.name".to_string(), "author.avatar".to_string()],
        ..PluginOptions::new("my-repo")
    };
    let client = PrismicClient::from_options(&options).unwrap();
    let documents = client.query_all_documents("master-ref").await.unwrap();
    assert_eq!(documents.len(), 1);
}

// ── By ids ──────────────────────────────────────────────────────

#[tokio::test]
async fn query_by_ids_uses_master_ref_and_in_predicate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("ref", "master-ref"))
        .and(query_param("q", r#"[[in(document.id, ["a","b"])]]"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 1, &["a"])))
        .expect(1)
        .mount(&server)
        .await;

    let documents = client_for(&server)
        .query_documents_by_ids(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, "a");
}

#[tokio::test]
async fn query_by_ids_uses_release_ref() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("ref", "spring-ref"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 1, &["a"])))
        .expect(1)
        .mount(&server)
        .await;

    let options = PluginOptions {
        api_endpoint: Some(format!("{}/api/v2", server.uri())),
        release_id: Some("spring".to_string()),
        ..PluginOptions::new("my-repo")
    };
    let client = PrismicClient::from_options(&options).unwrap();
    let documents = client.query_documents_by_ids(&["a".to_string()]).await.unwrap();
    assert_eq!(documents.len(), 1);
}

#[tokio::test]
async fn query_by_no_ids_makes_no_request() {
    let server = MockServer::start().await;
    let documents = client_for(&server).query_documents_by_ids(&[]).await.unwrap();
    assert!(documents.is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

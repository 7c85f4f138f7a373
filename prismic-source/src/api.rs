//! Prismic REST API v2 client.
//!
//! `GET {endpoint}` describes the repository (refs, languages); documents come
//! from `GET {endpoint}/documents/search`, one page of at most 100 at a time.
//! Pages are fetched sequentially until `total_pages`, and a failed page fails
//! the whole query.

use crate::config::PluginOptions;
use crate::error::{SourceError, SourceResult};
use async_trait::async_trait;
use prismic_model::RawDocument;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Documents per search page (the API maximum).
pub const PAGE_SIZE: u32 = 100;

/// A ref: a version of the repository's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub is_master_ref: bool,
}

/// What `GET {endpoint}` returns, reduced to what sourcing needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
    #[serde(default)]
    pub types: serde_json::Map<String, serde_json::Value>,
}

impl RepositoryMetadata {
    pub fn master_ref(&self) -> Option<&ApiRef> {
        self.refs.iter().find(|r| r.is_master_ref)
    }

    /// The ref of `release_id`, or the master ref without one.
    pub fn select_ref(&self, release_id: Option<&str>) -> SourceResult<&ApiRef> {
        match release_id {
            Some(release_id) => self
                .refs
                .iter()
                .find(|r| r.id == release_id)
                .ok_or_else(|| SourceError::Config(format!("release not found: {release_id}"))),
            None => self
                .master_ref()
                .ok_or_else(|| SourceError::Api {
                    status: 200,
                    message: "repository has no master ref".to_string(),
                }),
        }
    }
}

/// One page of `/documents/search`.
#[derive(Debug, Clone, Deserialize)]
struct SearchPage {
    page: u32,
    total_pages: u32,
    #[serde(default)]
    results: Vec<RawDocument>,
}

/// Access to a repository's content.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn get_repository_metadata(&self) -> SourceResult<RepositoryMetadata>;

    /// Every document visible under `reference`.
    async fn query_all_documents(&self, reference: &str) -> SourceResult<Vec<RawDocument>>;

    /// The documents with the given ids under the configured ref. Ids that do
    /// not exist (anymore) are simply absent from the result.
    async fn query_documents_by_ids(&self, ids: &[String]) -> SourceResult<Vec<RawDocument>>;
}

/// Client settings taken from [`PluginOptions`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
    pub release_id: Option<String>,
    pub lang: String,
    pub fetch_links: Vec<String>,
    pub graph_query: Option<String>,
}

impl From<&PluginOptions> for ClientConfig {
    fn from(options: &PluginOptions) -> Self {
        Self {
            endpoint: options.api_endpoint(),
            access_token: options.access_token.clone(),
            release_id: options.release_id.clone(),
            lang: options.lang.clone(),
            fetch_links: options.fetch_links.clone(),
            graph_query: options.graph_query.clone(),
        }
    }
}

/// HTTP implementation of [`ContentApi`].
pub struct PrismicClient {
    config: ClientConfig,
    client: Client,
}

impl PrismicClient {
    pub fn new(config: ClientConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SourceError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn from_options(options: &PluginOptions) -> SourceResult<Self> {
        options.validate()?;
        Self::new(ClientConfig::from(options))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Fetches every page of a search under `reference`, narrowed by `q`.
    pub async fn search_all(&self, reference: &str, q: Option<&str>) -> SourceResult<Vec<RawDocument>> {
        let mut documents = Vec::new();
        let mut page = 1;

        loop {
            let result = self.search_page(reference, q, page).await?;
            debug!(
                "Fetched page {} of {} ({} documents)",
                result.page,
                result.total_pages,
                result.results.len()
            );
            documents.extend(result.results);

            if result.page >= result.total_pages {
                break;
            }
            page = result.page + 1;
        }

        Ok(documents)
    }

    async fn search_page(&self, reference: &str, q: Option<&str>, page: u32) -> SourceResult<SearchPage> {
        let page_param = page.to_string();
        let page_size = PAGE_SIZE.to_string();
        let fetch_links = self.config.fetch_links.join(",");
        let mut params: Vec<(&str, &str)> = vec![
            ("ref", reference),
            ("page", page_param.as_str()),
            ("pageSize", page_size.as_str()),
            ("lang", self.config.lang.as_str()),
        ];

        if !fetch_links.is_empty() {
            params.push(("fetchLinks", fetch_links.as_str()));
        }
        if let Some(graph_query) = &self.config.graph_query {
            params.push(("graphQuery", graph_query.as_str()));
        }
        if let Some(token) = &self.config.access_token {
            params.push(("access_token", token.as_str()));
        }
        if let Some(q) = q {
            params.push(("q", q));
        }

        let response = self
            .client
            .get(format!("{}/documents/search", self.config.endpoint))
            .query(&params)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("document search failed: {e}")))?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| SourceError::Network(format!("failed to parse search page {page}: {e}")))
    }

    async fn current_ref(&self) -> SourceResult<String> {
        let metadata = self.get_repository_metadata().await?;
        let selected = metadata.select_ref(self.config.release_id.as_deref())?;
        Ok(selected.reference.clone())
    }
}

#[async_trait]
impl ContentApi for PrismicClient {
    async fn get_repository_metadata(&self) -> SourceResult<RepositoryMetadata> {
        let mut request = self.client.get(&self.config.endpoint);
        if let Some(token) = &self.config.access_token {
            request = request.query(&[("access_token", token.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("repository request failed: {e}")))?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| SourceError::Network(format!("failed to parse repository metadata: {e}")))
    }

    async fn query_all_documents(&self, reference: &str) -> SourceResult<Vec<RawDocument>> {
        let documents = self.search_all(reference, None).await?;
        info!("Fetched {} documents", documents.len());
        Ok(documents)
    }

    async fn query_documents_by_ids(&self, ids: &[String]) -> SourceResult<Vec<RawDocument>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let reference = self.current_ref().await?;
        let q = ids_predicate(ids);
        self.search_all(&reference, Some(q.as_str())).await
    }
}

/// `[[in(document.id, ["a","b"])]]`
pub fn ids_predicate(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('"', "\\\"")))
        .collect();
    format!("[[in(document.id, [{}])]]", quoted.join(","))
}

/// `[[at(document.id, "a")]]`
pub fn id_predicate(id: &str) -> String {
    format!("[[at(document.id, \"{}\")]]", id.replace('"', "\\\""))
}

pub(crate) async fn check_status(response: Response) -> SourceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        return Err(SourceError::Unauthorized(message));
    }
    Err(SourceError::Api {
        status: status.as_u16(),
        message,
    })
}

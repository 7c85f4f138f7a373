//! HTTP side of preview sessions.

use crate::api::{check_status, id_predicate, PrismicClient};
use crate::error::SourceError;
use async_trait::async_trait;
use prismic_model::RawDocument;
use prismic_runtime::{PreviewApi, PreviewFailure, PreviewToken};
use prismic_types::TypePathSet;
use tracing::debug;

/// Fetches drafts through the content API (the preview token is used as the
/// ref) and the type path file from where the build published it.
pub struct HttpPreviewApi {
    client: PrismicClient,
    type_paths_url: String,
}

impl HttpPreviewApi {
    pub fn new(client: PrismicClient, type_paths_url: impl Into<String>) -> Self {
        Self {
            client,
            type_paths_url: type_paths_url.into(),
        }
    }
}

#[async_trait]
impl PreviewApi for HttpPreviewApi {
    async fn fetch_preview_document(
        &self,
        token: &PreviewToken,
        document_id: &str,
    ) -> Result<RawDocument, PreviewFailure> {
        debug!("Fetching preview of {}", document_id);
        let q = id_predicate(document_id);
        let documents = self
            .client
            .search_all(token.as_str(), Some(q.as_str()))
            .await
            .map_err(to_failure)?;

        documents
            .into_iter()
            .find(|document| document.id == document_id)
            .ok_or_else(|| PreviewFailure::DocumentNotFound(document_id.to_string()))
    }

    async fn fetch_type_paths(&self) -> Result<TypePathSet, PreviewFailure> {
        let response = self
            .client
            .http()
            .get(&self.type_paths_url)
            .send()
            .await
            .map_err(|e| PreviewFailure::Network(format!("type paths request failed: {e}")))?;

        let response = check_status(response).await.map_err(to_failure)?;
        let body = response
            .text()
            .await
            .map_err(|e| PreviewFailure::Network(format!("failed to read type paths: {e}")))?;

        TypePathSet::from_json(&body).map_err(|e| PreviewFailure::Network(e.to_string()))
    }
}

fn to_failure(e: SourceError) -> PreviewFailure {
    match e {
        SourceError::Unauthorized(_) => PreviewFailure::Unauthorized,
        other => PreviewFailure::Network(other.to_string()),
    }
}

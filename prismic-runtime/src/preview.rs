//! Preview sessions.
//!
//! An editor opens a preview link carrying `token` and `documentId`. The
//! session first resolves the link to the previewed page
//! (`Init → Resolving → Resolved`), then, on that page, loads the draft and
//! the type paths into a [`Runtime`] (`Bootstrapping → Bootstrapped`). Any
//! step may end in [`PreviewState::Failed`].
//!
//! A link without both parameters, or whose token belongs to another
//! repository, is not a preview for this session and leaves it in `Init`.

use crate::runtime::Runtime;
use async_trait::async_trait;
use prismic_model::RawDocument;
use prismic_types::TypePathSet;
use reqwest::Url;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a preview could not be shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewFailure {
    /// The token does not grant access to the document (HTTP 401). The
    /// caller may ask for credentials and retry.
    #[error("preview token not authorized")]
    Unauthorized,

    /// The token is not a URL on this repository.
    #[error("invalid preview token: {0}")]
    InvalidToken(String),

    /// The link carries no preview parameters.
    #[error("not a preview link")]
    NotAPreview,

    /// Fetching the document or the type paths failed.
    #[error("network error: {0}")]
    Network(String),

    /// The previewed document does not exist under the token's ref.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// The runtime rejected the fetched data.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// `token` and `documentId` of a preview link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewParams {
    pub token: String,
    pub document_id: String,
}

impl PreviewParams {
    /// Reads the parameters from a query string (leading `?` optional).
    ///
    /// Returns `None` unless both are present and non-empty.
    pub fn from_query(query: &str) -> Option<Self> {
        let mut token = None;
        let mut document_id = None;

        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode(&value.replace('+', " "));
            match key {
                "token" if !value.is_empty() => token = Some(value),
                "documentId" if !value.is_empty() => document_id = Some(value),
                _ => {}
            }
        }

        Some(Self {
            token: token?,
            document_id: document_id?,
        })
    }
}

/// A preview token checked against a repository.
///
/// Prismic preview tokens are URLs on the repository's domain; the token
/// string itself is used as the content API ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewToken {
    token: String,
    url: Url,
}

impl PreviewToken {
    /// Parses `token` and checks that it belongs to `repository_name`.
    ///
    /// Accepts `<repository>.prismic.io`, `<repository>.cdn.prismic.io` and
    /// `<repository>.wroom.io` hosts.
    pub fn parse(token: &str, repository_name: &str) -> Result<Self, PreviewFailure> {
        // Tokens arrive either raw or still percent-encoded.
        let token = if token.contains("://") {
            token.to_string()
        } else {
            decode(token)
        };
        let url = Url::parse(&token)
            .map_err(|e| PreviewFailure::InvalidToken(format!("{token}: {e}")))?;

        let host = url
            .host_str()
            .ok_or_else(|| PreviewFailure::InvalidToken(format!("{token}: no host")))?;
        let allowed = [
            format!("{repository_name}.prismic.io"),
            format!("{repository_name}.cdn.prismic.io"),
            format!("{repository_name}.wroom.io"),
        ];
        if !allowed.iter().any(|candidate| candidate == host) {
            return Err(PreviewFailure::InvalidToken(format!(
                "{host} is not a host of repository {repository_name}"
            )));
        }

        Ok(Self { token, url })
    }

    /// The token, usable as a content API ref.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for PreviewToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// Fetches preview data.
#[async_trait]
pub trait PreviewApi: Send + Sync {
    /// The draft of `document_id` under the token's ref.
    async fn fetch_preview_document(
        &self,
        token: &PreviewToken,
        document_id: &str,
    ) -> Result<RawDocument, PreviewFailure>;

    /// The type paths written at build time.
    async fn fetch_type_paths(&self) -> Result<TypePathSet, PreviewFailure>;
}

/// Where a session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Init,
    Resolving,
    /// The link resolved to the page at `url` (`None` without a link
    /// resolver, or when it declined the document).
    Resolved { url: Option<String> },
    Bootstrapping,
    /// The draft is in the runtime under its Prismic id.
    Bootstrapped { document_id: String },
    Failed(PreviewFailure),
}

/// A preview session for one repository.
#[derive(Debug)]
pub struct PreviewSession {
    repository_name: String,
    state: PreviewState,
}

impl PreviewSession {
    pub fn new(repository_name: impl Into<String>) -> Self {
        Self {
            repository_name: repository_name.into(),
            state: PreviewState::Init,
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    /// Checks a preview link's query string.
    ///
    /// `NotAPreview` and `InvalidToken` mean the link is not for this session.
    pub fn params(&self, query: &str) -> Result<(PreviewParams, PreviewToken), PreviewFailure> {
        let params = PreviewParams::from_query(query).ok_or(PreviewFailure::NotAPreview)?;
        let token = PreviewToken::parse(&params.token, &self.repository_name)?;
        Ok((params, token))
    }

    /// Resolves a preview link to the URL of the previewed page.
    pub async fn resolve(&mut self, query: &str, runtime: &Runtime, api: &dyn PreviewApi) -> &PreviewState {
        let Some((params, token)) = self.accept(query) else {
            return &self.state;
        };

        self.state = PreviewState::Resolving;
        self.state = match api.fetch_preview_document(&token, &params.document_id).await {
            Ok(document) => {
                let url = runtime.resolve_url(&document.to_value());
                info!("Resolved preview of {} to {:?}", params.document_id, url);
                PreviewState::Resolved { url }
            }
            Err(failure) => fail(failure),
        };
        &self.state
    }

    /// Loads the type paths and the draft document into `runtime`.
    pub async fn bootstrap(&mut self, query: &str, runtime: &Runtime, api: &dyn PreviewApi) -> &PreviewState {
        let Some((params, token)) = self.accept(query) else {
            return &self.state;
        };

        self.state = PreviewState::Bootstrapping;
        self.state = match load(&params, &token, runtime, api).await {
            Ok(()) => {
                info!("Bootstrapped preview of {}", params.document_id);
                PreviewState::Bootstrapped {
                    document_id: params.document_id,
                }
            }
            Err(failure) => fail(failure),
        };
        &self.state
    }

    fn accept(&mut self, query: &str) -> Option<(PreviewParams, PreviewToken)> {
        match self.params(query) {
            Ok(accepted) => Some(accepted),
            Err(reason) => {
                debug!("Ignoring link for repository {}: {}", self.repository_name, reason);
                self.state = PreviewState::Init;
                None
            }
        }
    }
}

async fn load(
    params: &PreviewParams,
    token: &PreviewToken,
    runtime: &Runtime,
    api: &dyn PreviewApi,
) -> Result<(), PreviewFailure> {
    let type_paths = api.fetch_type_paths().await?;
    runtime
        .register_type_paths(type_paths.iter())
        .map_err(|e| PreviewFailure::Runtime(e.to_string()))?;

    let document = api.fetch_preview_document(token, &params.document_id).await?;
    runtime
        .register_documents(&[document])
        .map_err(|e| PreviewFailure::Runtime(e.to_string()))
}

fn fail(failure: PreviewFailure) -> PreviewState {
    warn!("Preview failed: {}", failure);
    PreviewState::Failed(failure)
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

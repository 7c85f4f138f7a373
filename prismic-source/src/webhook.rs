//! Incremental updates from Prismic webhooks.
//!
//! An `api-update` webhook lists the ids of changed documents. They are
//! re-fetched: returned documents replace their nodes, ids the API no longer
//! returns are deleted. Every other Prismic node is touched so the host keeps
//! it.

use crate::api::ContentApi;
use crate::config::PluginOptions;
use crate::downloads::{download_files, FileDownloader};
use crate::error::SourceResult;
use crate::host::{find_document_node, NodeHost};
use crate::sourcing::{create_document_nodes, persist_type_paths};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WebhookKind {
    ApiUpdate,
    TestTrigger,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRelease {
    pub id: String,
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookReleases {
    #[serde(default)]
    pub addition: Vec<WebhookRelease>,
    #[serde(default)]
    pub update: Vec<WebhookRelease>,
    #[serde(default)]
    pub deletion: Vec<WebhookRelease>,
}

/// Body of a Prismic webhook request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub kind: WebhookKind,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub master_ref: Option<String>,
    /// Repository that sent the webhook.
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub releases: WebhookReleases,
}

impl WebhookPayload {
    pub fn from_json(json: &str) -> SourceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Ids of changed documents, including those of the configured release.
    pub fn changed_document_ids(&self, release_id: Option<&str>) -> Vec<String> {
        let mut ids: BTreeSet<String> = self.documents.iter().cloned().collect();

        if let Some(release_id) = release_id {
            let releases = self
                .releases
                .addition
                .iter()
                .chain(&self.releases.update)
                .chain(&self.releases.deletion);
            for release in releases.filter(|r| r.id == release_id) {
                ids.extend(release.documents.iter().cloned());
            }
        }

        ids.into_iter().collect()
    }
}

/// What handling a webhook did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Sent by another repository, or of an unknown kind.
    Ignored,
    /// The secret did not match; nodes were only touched.
    SecretMismatch,
    TestTrigger,
    Updated { updated: usize, deleted: usize },
}

/// Applies a webhook to the host's nodes.
pub async fn handle_webhook(
    payload: &WebhookPayload,
    options: &PluginOptions,
    api: &dyn ContentApi,
    host: &dyn NodeHost,
    downloader: &dyn FileDownloader,
) -> SourceResult<WebhookOutcome> {
    if let Some(domain) = &payload.domain {
        if domain != &options.repository_name {
            debug!("Ignoring webhook for repository {}", domain);
            return Ok(WebhookOutcome::Ignored);
        }
    }

    if payload.secret != options.webhook_secret {
        warn!(
            "A webhook was received, but the webhook secret did not match the webhookSecret \
             option of repository {}. Nodes were not updated.",
            options.repository_name
        );
        touch_all_nodes(host);
        return Ok(WebhookOutcome::SecretMismatch);
    }

    match payload.kind {
        WebhookKind::TestTrigger => {
            info!("Received a test trigger webhook from repository {}", options.repository_name);
            touch_all_nodes(host);
            Ok(WebhookOutcome::TestTrigger)
        }
        WebhookKind::Other => {
            debug!("Ignoring webhook of unknown type");
            touch_all_nodes(host);
            Ok(WebhookOutcome::Ignored)
        }
        WebhookKind::ApiUpdate => {
            touch_all_nodes(host);
            apply_update(payload, options, api, host, downloader).await
        }
    }
}

async fn apply_update(
    payload: &WebhookPayload,
    options: &PluginOptions,
    api: &dyn ContentApi,
    host: &dyn NodeHost,
    downloader: &dyn FileDownloader,
) -> SourceResult<WebhookOutcome> {
    let ids = payload.changed_document_ids(options.release_id.as_deref());
    if ids.is_empty() {
        return Ok(WebhookOutcome::Updated {
            updated: 0,
            deleted: 0,
        });
    }

    let documents = api.query_documents_by_ids(&ids).await?;
    let returned: BTreeSet<&str> = documents.iter().map(|d| d.id.as_str()).collect();

    let mut deleted = 0;
    for id in ids.iter().filter(|id| !returned.contains(id.as_str())) {
        let node_id = find_document_node(host, id)
            .and_then(|node| node.get("id").and_then(Value::as_str).map(str::to_string));
        if let Some(node_id) = node_id {
            if host.delete_node(&node_id) {
                deleted += 1;
            }
        }
    }

    let type_paths = options.type_paths();
    let created = create_document_nodes(&documents, &type_paths, options, host)?;
    download_files(created.downloads, host, downloader).await?;
    persist_type_paths(&type_paths, host)?;

    info!(
        "Webhook updated {} documents and deleted {}",
        created.documents, deleted
    );
    Ok(WebhookOutcome::Updated {
        updated: created.documents,
        deleted,
    })
}

/// Touches every node created by this source.
pub fn touch_all_nodes(host: &dyn NodeHost) {
    for node in host.get_nodes() {
        let node_type = node.pointer("/internal/type").and_then(Value::as_str);
        let ours = matches!(node_type, Some(t) if t.starts_with("Prismic") || t == "File");
        if let (true, Some(id)) = (ours, node.get("id").and_then(Value::as_str)) {
            host.touch_node(id);
        }
    }
}

//! File downloads requested during normalization.
//!
//! Each request becomes a `File` node whose id is the one the field's
//! `localFile` already points at. A URL is downloaded at most once: the host
//! cache remembers finished downloads under `file-node-<url>`, and duplicate
//! requests within one batch collapse into one.

use crate::error::{SourceError, SourceResult};
use crate::host::NodeHost;
use async_trait::async_trait;
use futures::future::join_all;
use prismic_normalize::DownloadRequest;
use prismic_types::sha256_hex;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Turns a download request into a file node.
#[async_trait]
pub trait FileDownloader: Send + Sync {
    async fn download(&self, request: &DownloadRequest) -> SourceResult<Value>;
}

/// Downloads over HTTP into a directory.
pub struct HttpDownloader {
    client: Client,
    dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| SourceError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            dir: dir.into(),
        })
    }
}

#[async_trait]
impl FileDownloader for HttpDownloader {
    async fn download(&self, request: &DownloadRequest) -> SourceResult<Value> {
        debug!("Downloading {}", request.url);

        let response = self
            .client
            .get(&request.url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("download of {} failed: {e}", request.url)))?;

        let response = crate::api::check_status(response).await?;
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("download of {} failed: {e}", request.url)))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SourceError::Host(format!("cannot create {}: {e}", self.dir.display())))?;

        let name = format!("{}{}", request.node_id, extension(&request.url));
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| SourceError::Host(format!("cannot write {}: {e}", path.display())))?;

        Ok(file_node(request, &sha256_hex(&bytes), bytes.len(), mime_type, Some(path)))
    }
}

/// The node recorded for a downloaded file.
pub fn file_node(
    request: &DownloadRequest,
    digest: &str,
    size: usize,
    mime_type: Option<String>,
    path: Option<PathBuf>,
) -> Value {
    json!({
        "id": request.node_id.to_string(),
        "url": request.url,
        "fieldPath": request.field_path,
        "size": size,
        "mimeType": mime_type,
        "absolutePath": path.map(|p| p.display().to_string()),
        "internal": {
            "type": "File",
            "contentDigest": digest,
        },
    })
}

/// Counts of one download batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    /// Already downloaded in an earlier build; the node was only touched.
    pub cached: usize,
    pub failed: usize,
}

/// Downloads every requested file concurrently and records the file nodes.
///
/// A failed download is logged and counted; the field's `localFile` then
/// points at a node that does not exist.
pub async fn download_files(
    requests: Vec<DownloadRequest>,
    host: &dyn NodeHost,
    downloader: &dyn FileDownloader,
) -> SourceResult<DownloadReport> {
    let mut report = DownloadReport::default();
    let mut seen = HashSet::new();
    let mut pending = Vec::new();

    for request in requests {
        let key = request.cache_key();
        if !seen.insert(key.clone()) {
            continue;
        }

        let cached_id = host
            .cache_get(&key)
            .and_then(|v| v.as_str().map(str::to_string));
        if let Some(id) = cached_id.filter(|id| host.get_node(id).is_some()) {
            host.touch_node(&id);
            report.cached += 1;
            continue;
        }

        pending.push(request);
    }

    let results = join_all(pending.iter().map(|request| downloader.download(request))).await;

    for (request, result) in pending.iter().zip(results) {
        match result {
            Ok(node) => {
                host.create_node(node)?;
                host.cache_set(&request.cache_key(), json!(request.node_id.to_string()));
                report.downloaded += 1;
            }
            Err(e) => {
                warn!("Could not download {} for {}: {}", request.url, request.field_path, e);
                report.failed += 1;
            }
        }
    }

    if report.downloaded + report.failed > 0 {
        info!(
            "Downloaded {} files ({} cached, {} failed)",
            report.downloaded, report.cached, report.failed
        );
    }
    Ok(report)
}

/// File extension of the URL's last path segment, query excluded.
fn extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    match last.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() && ext.len() <= 5 => {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    }
}

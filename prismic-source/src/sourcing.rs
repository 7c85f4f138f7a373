//! Build-time sourcing.
//!
//! 1. Derive the type paths of every configured model
//! 2. Pick the ref (master, or the configured release)
//! 3. Fetch every document under it
//! 4. Normalize each document and hand it to the host, together with the
//!    embed and integration nodes created along the way
//! 5. Download the requested files
//! 6. Persist the type paths for previews
//!
//! Linked documents are stored as node ids; the host follows them.

use crate::api::ContentApi;
use crate::config::PluginOptions;
use crate::downloads::{download_files, DownloadReport, FileDownloader};
use crate::error::SourceResult;
use crate::host::NodeHost;
use prismic_model::RawDocument;
use prismic_normalize::{
    normalize_document, CollectingSink, DownloadRequest, LinkedDocuments, NormalizeDeps,
};
use prismic_types::TypePathSet;
use serde_json::Value;
use tracing::{debug, info};

/// Host cache key holding the serialized type paths of the last build.
pub const TYPE_PATHS_CACHE_KEY: &str = "prismic-type-paths";

/// Outcome of a sourcing run.
#[derive(Debug)]
pub struct SourceReport {
    pub type_paths: TypePathSet,
    pub documents: usize,
    /// Embed and integration field nodes.
    pub synthetic: usize,
    pub downloads: DownloadReport,
}

/// Sources every document of the repository into `host`.
pub async fn source_nodes(
    options: &PluginOptions,
    api: &dyn ContentApi,
    host: &dyn NodeHost,
    downloader: &dyn FileDownloader,
) -> SourceResult<SourceReport> {
    options.validate()?;

    let type_paths = options.type_paths();
    info!(
        "Derived {} type paths for repository {}",
        type_paths.len(),
        options.repository_name
    );

    let metadata = api.get_repository_metadata().await?;
    let reference = metadata.select_ref(options.release_id.as_deref())?;
    debug!("Sourcing ref {} ({})", reference.id, reference.reference);

    let documents = api.query_all_documents(&reference.reference).await?;
    let created = create_document_nodes(&documents, &type_paths, options, host)?;
    let downloads = download_files(created.downloads, host, downloader).await?;

    persist_type_paths(&type_paths, host)?;

    info!(
        "Sourced {} documents and {} nested nodes",
        created.documents, created.synthetic
    );
    Ok(SourceReport {
        type_paths,
        documents: created.documents,
        synthetic: created.synthetic,
        downloads,
    })
}

pub(crate) struct CreatedNodes {
    pub documents: usize,
    pub synthetic: usize,
    pub downloads: Vec<DownloadRequest>,
}

/// Normalizes `documents` and creates their nodes.
pub(crate) fn create_document_nodes(
    documents: &[RawDocument],
    type_paths: &TypePathSet,
    options: &PluginOptions,
    host: &dyn NodeHost,
) -> SourceResult<CreatedNodes> {
    let normalize_options = options.to_normalize_options(LinkedDocuments::NodeId);
    let sink = CollectingSink::new();
    let deps = NormalizeDeps::new(type_paths, &(), &sink, &normalize_options);

    for document in documents {
        host.create_node(normalize_document(document, &deps))?;
    }

    let synthetic = sink.take_nodes();
    let synthetic_count = synthetic.len();
    for node in synthetic {
        host.create_node(node)?;
    }

    Ok(CreatedNodes {
        documents: documents.len(),
        synthetic: synthetic_count,
        downloads: sink.take_downloads(),
    })
}

/// Stores the type paths in the host cache.
pub fn persist_type_paths(type_paths: &TypePathSet, host: &dyn NodeHost) -> SourceResult<()> {
    host.cache_set(TYPE_PATHS_CACHE_KEY, Value::String(type_paths.to_json()?));
    Ok(())
}

/// Reads back the type paths stored by [`persist_type_paths`].
pub fn load_type_paths(host: &dyn NodeHost) -> SourceResult<Option<TypePathSet>> {
    match host.cache_get(TYPE_PATHS_CACHE_KEY) {
        Some(Value::String(json)) => Ok(Some(TypePathSet::from_json(&json)?)),
        _ => Ok(None),
    }
}

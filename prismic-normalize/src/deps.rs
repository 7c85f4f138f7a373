//! Collaborators injected into the normalizers.

use crate::options::NormalizeOptions;
use prismic_types::{FieldKind, NodeId, TypePathSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

/// Looks up the declared kind of a location.
pub trait TypePathLookup {
    fn get_type_path(&self, path: &[String]) -> Option<FieldKind>;
}

impl TypePathLookup for TypePathSet {
    fn get_type_path(&self, path: &[String]) -> Option<FieldKind> {
        self.get(path).cloned()
    }
}

/// Looks up an already normalized document by its Prismic API id.
pub trait NodeLookup {
    fn get_node(&self, prismic_id: &str) -> Option<Value>;
}

/// A lookup that never finds anything.
impl NodeLookup for () {
    fn get_node(&self, _prismic_id: &str) -> Option<Value> {
        None
    }
}

/// A file the host should download and expose as a file node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    /// Id of the file node the field's `localFile` points at.
    pub node_id: NodeId,
    /// Dotted path of the field that asked for the file.
    pub field_path: String,
}

impl DownloadRequest {
    pub fn new(url: &str, path: &[String]) -> Self {
        Self {
            url: url.to_string(),
            node_id: NodeId::for_remote_file(url),
            field_path: path.join("."),
        }
    }

    /// Host cache key under which a finished download is recorded.
    pub fn cache_key(&self) -> String {
        format!("file-node-{}", self.url)
    }
}

/// Receives the side effects of normalization.
pub trait NodeSink {
    /// A synthetic node (embed, integration field) to hand to the host.
    fn create_node(&self, node: Value);

    /// A file to download.
    fn request_download(&self, request: DownloadRequest);
}

/// Discards every side effect.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NodeSink for NullSink {
    fn create_node(&self, _node: Value) {}

    fn request_download(&self, _request: DownloadRequest) {}
}

/// Buffers side effects until the caller drains them.
#[derive(Debug, Default)]
pub struct CollectingSink {
    nodes: Mutex<Vec<Value>>,
    downloads: Mutex<Vec<DownloadRequest>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the collected synthetic nodes.
    pub fn take_nodes(&self) -> Vec<Value> {
        std::mem::take(&mut *self.nodes.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Removes and returns the collected download requests.
    pub fn take_downloads(&self) -> Vec<DownloadRequest> {
        std::mem::take(&mut *self.downloads.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NodeSink for CollectingSink {
    fn create_node(&self, node: Value) {
        self.nodes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(node);
    }

    fn request_download(&self, request: DownloadRequest) {
        self.downloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }
}

/// Everything a normalizer may consult.
#[derive(Clone, Copy)]
pub struct NormalizeDeps<'a> {
    pub type_paths: &'a dyn TypePathLookup,
    pub nodes: &'a dyn NodeLookup,
    pub sink: &'a dyn NodeSink,
    pub options: &'a NormalizeOptions,
}

impl<'a> NormalizeDeps<'a> {
    pub fn new(
        type_paths: &'a dyn TypePathLookup,
        nodes: &'a dyn NodeLookup,
        sink: &'a dyn NodeSink,
        options: &'a NormalizeOptions,
    ) -> Self {
        Self {
            type_paths,
            nodes,
            sink,
            options,
        }
    }

    pub(crate) fn field_segment(&self, key: &str) -> String {
        self.options.transform_field_name.apply(key)
    }
}

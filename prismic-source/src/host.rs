//! The host build system's node store.
//!
//! Nodes are JSON objects carrying an `id` and `internal.type`. The host keeps
//! them across builds; a node that is neither created nor touched during a
//! build is garbage-collected by the host afterwards.

use crate::error::{SourceError, SourceResult};
use prismic_types::{content_digest, NodeId};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

/// Node and cache operations the host offers to a source.
pub trait NodeHost: Send + Sync {
    /// Creates or replaces the node with the same `id`.
    fn create_node(&self, node: Value) -> SourceResult<()>;

    /// Keeps an existing node alive for this build.
    fn touch_node(&self, id: &str);

    /// Removes a node. Returns whether it existed.
    fn delete_node(&self, id: &str) -> bool;

    fn get_node(&self, id: &str) -> Option<Value>;

    fn get_nodes(&self) -> Vec<Value>;

    fn cache_get(&self, key: &str) -> Option<Value>;

    fn cache_set(&self, key: &str, value: Value);

    fn create_node_id(&self, seed: &str) -> String {
        NodeId::from_seed(seed).to_string()
    }

    fn create_content_digest(&self, value: &Value) -> String {
        content_digest(value)
    }
}

/// Node ids of every node created from a Prismic document.
pub fn document_node_ids(host: &dyn NodeHost) -> Vec<String> {
    host.get_nodes()
        .iter()
        .filter(|node| node.get("prismicId").is_some() && node.get("dataRaw").is_some())
        .filter_map(|node| node.get("id").and_then(Value::as_str).map(str::to_string))
        .collect()
}

/// The document node created for a Prismic API id.
pub fn find_document_node(host: &dyn NodeHost, prismic_id: &str) -> Option<Value> {
    host.get_nodes().into_iter().find(|node| {
        node.get("dataRaw").is_some()
            && node.get("prismicId").and_then(Value::as_str) == Some(prismic_id)
    })
}

/// An in-process host.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: RwLock<BTreeMap<String, Value>>,
    touched: RwLock<BTreeSet<String>>,
    cache: RwLock<HashMap<String, Value>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_touched(&self, id: &str) -> bool {
        self.touched
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Starts a new build: no node counts as touched.
    pub fn begin_build(&self) {
        self.touched
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Deletes every node not created or touched since [`Self::begin_build`].
    /// Returns the number of deleted nodes.
    pub fn sweep(&self) -> usize {
        let touched = self.touched.read().unwrap_or_else(PoisonError::into_inner);
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        let before = nodes.len();
        nodes.retain(|id, _| touched.contains(id));
        before - nodes.len()
    }

    /// Nodes of one `internal.type`.
    pub fn nodes_of_type(&self, node_type: &str) -> Vec<Value> {
        self.get_nodes()
            .into_iter()
            .filter(|node| node_type_of(node) == Some(node_type))
            .collect()
    }
}

impl NodeHost for MemoryHost {
    fn create_node(&self, node: Value) -> SourceResult<()> {
        let id = node
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| SourceError::Host("node has no id".to_string()))?
            .to_string();
        if node_type_of(&node).is_none() {
            return Err(SourceError::Host(format!("node {id} has no internal.type")));
        }

        self.touched
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, node);
        Ok(())
    }

    fn touch_node(&self, id: &str) {
        if self.get_node(id).is_some() {
            self.touched
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id.to_string());
        }
    }

    fn delete_node(&self, id: &str) -> bool {
        self.touched
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    fn get_node(&self, id: &str) -> Option<Value> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn get_nodes(&self) -> Vec<Value> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn cache_get(&self, key: &str) -> Option<Value> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn cache_set(&self, key: &str, value: Value) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }
}

fn node_type_of(node: &Value) -> Option<&str> {
    node.pointer("/internal/type").and_then(Value::as_str)
}

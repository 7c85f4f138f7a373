//! Document registry.
//!
//! A [`Runtime`] owns one repository's type paths and normalized documents.
//! It is created explicitly by whatever composes a build or a preview session
//! and passed by reference to its consumers.
//!
//! Subscribers run synchronously, in registration order, after every
//! mutating call. They must not mutate the runtime themselves: while
//! subscribers are being notified every mutating call fails with
//! [`RuntimeError::Reentrant`].

use crate::error::{RuntimeError, RuntimeResult};
use prismic_model::{
    derive_custom_type_type_paths, derive_shared_slice_type_paths, CustomTypeModel, RawDocument,
    SharedSliceModel,
};
use prismic_normalize::{
    normalize, normalize_document, CollectingSink, NodeLookup, NormalizeDeps,
    NormalizeOptions, TypePathLookup,
};
use prismic_types::{FieldKind, TypePath, TypePathSet};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// What changed in a mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// Type paths were added; `count` is the number of paths registered by
    /// the call.
    TypePathsRegistered { count: usize },
    /// Documents were normalized and stored, identified by Prismic id.
    DocumentsRegistered { ids: Vec<String> },
}

/// Handle returned by [`Runtime::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&RuntimeEvent) + Send + Sync>;

#[derive(Default)]
struct Documents {
    order: Vec<String>,
    by_id: HashMap<String, Value>,
}

/// A registry of type paths and normalized documents.
pub struct Runtime {
    options: NormalizeOptions,
    type_paths: RwLock<TypePathSet>,
    documents: RwLock<Documents>,
    synthetic: RwLock<HashMap<String, Value>>,
    sink: CollectingSink,
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
    notifying: AtomicBool,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(NormalizeOptions::default())
    }
}

impl Runtime {
    /// Creates an empty runtime normalizing with `options`.
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            type_paths: RwLock::new(TypePathSet::new()),
            documents: RwLock::new(Documents::default()),
            synthetic: RwLock::new(HashMap::new()),
            sink: CollectingSink::new(),
            subscribers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
            notifying: AtomicBool::new(false),
        }
    }

    /// Options documents are normalized with.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    // ── Type paths ───────────────────────────────────────────────────

    /// Derives and registers the type paths of Custom Type models.
    pub fn register_custom_type_models(&self, models: &[CustomTypeModel]) -> RuntimeResult<()> {
        let transform = &self.options.transform_field_name;
        let paths = models
            .iter()
            .flat_map(|model| derive_custom_type_type_paths(model, transform));
        self.register_type_paths(paths)
    }

    /// Derives and registers the type paths of Shared Slice models.
    pub fn register_shared_slice_models(&self, models: &[SharedSliceModel]) -> RuntimeResult<()> {
        let transform = &self.options.transform_field_name;
        let paths = models
            .iter()
            .flat_map(|model| derive_shared_slice_type_paths(model, transform));
        self.register_type_paths(paths)
    }

    /// Registers already derived type paths, e.g. a set read back from the
    /// file written at build time.
    pub fn register_type_paths(&self, paths: impl IntoIterator<Item = TypePath>) -> RuntimeResult<()> {
        self.ensure_not_notifying()?;

        let count = {
            let mut set = write(&self.type_paths);
            let before = set.len();
            let mut count = 0;
            for path in paths {
                set.insert(path);
                count += 1;
            }
            debug!("Registered {} type paths ({} new)", count, set.len() - before);
            count
        };

        self.notify(&RuntimeEvent::TypePathsRegistered { count });
        Ok(())
    }

    /// Parses and registers a serialized type path set.
    pub fn register_type_paths_json(&self, json: &str) -> RuntimeResult<()> {
        let set = TypePathSet::from_json(json)?;
        self.register_type_paths(set.iter())
    }

    /// Kind registered for an exact path.
    pub fn get_type_path(&self, path: &[String]) -> Option<FieldKind> {
        read(&self.type_paths).get(path).cloned()
    }

    /// Snapshot of all registered type paths.
    pub fn type_paths(&self) -> TypePathSet {
        read(&self.type_paths).clone()
    }

    // ── Documents ────────────────────────────────────────────────────

    /// Normalizes and stores documents, in order.
    ///
    /// Each document is stored before the next one is normalized, so links to
    /// a document earlier in the batch resolve. A document already stored
    /// under the same Prismic id is replaced in place.
    pub fn register_documents(&self, documents: &[RawDocument]) -> RuntimeResult<()> {
        self.ensure_not_notifying()?;

        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            let normalized = {
                let deps = NormalizeDeps::new(self, self, &self.sink, &self.options);
                normalize_document(document, &deps)
            };
            self.store_side_effects();

            let mut store = write(&self.documents);
            if store.by_id.insert(document.id.clone(), normalized).is_none() {
                store.order.push(document.id.clone());
            }
            ids.push(document.id.clone());
        }

        info!("Registered {} documents", ids.len());
        self.notify(&RuntimeEvent::DocumentsRegistered { ids });
        Ok(())
    }

    /// Normalizes a single value without the raw fallback.
    ///
    /// Does not store anything; synthetic nodes it creates are kept.
    pub fn normalize(&self, path: &[String], value: &Value) -> RuntimeResult<Value> {
        let normalized = {
            let deps = NormalizeDeps::new(self, self, &self.sink, &self.options);
            normalize(path, value, &deps)?
        };
        self.store_side_effects();
        Ok(normalized)
    }

    /// A normalized document by its Prismic id.
    pub fn get_node(&self, prismic_id: &str) -> Option<Value> {
        read(&self.documents).by_id.get(prismic_id).cloned()
    }

    /// All normalized documents, in registration order.
    pub fn get_nodes(&self) -> Vec<Value> {
        let store = read(&self.documents);
        store
            .order
            .iter()
            .filter_map(|id| store.by_id.get(id).cloned())
            .collect()
    }

    /// A synthetic node (embed, integration field) by node id.
    pub fn get_synthetic_node(&self, node_id: &str) -> Option<Value> {
        read(&self.synthetic).get(node_id).cloned()
    }

    /// Builds a document's URL with the configured link resolver.
    pub fn resolve_url(&self, document: &Value) -> Option<String> {
        self.options
            .link_resolver
            .as_ref()
            .and_then(|resolve| resolve(document))
    }

    fn store_side_effects(&self) {
        let nodes = self.sink.take_nodes();
        if !nodes.is_empty() {
            let mut synthetic = write(&self.synthetic);
            for node in nodes {
                if let Some(id) = node.get("id").and_then(Value::as_str) {
                    synthetic.insert(id.to_string(), node.clone());
                }
            }
        }
        // Files are never downloaded at runtime.
        let _ = self.sink.take_downloads();
    }

    // ── Subscribers ──────────────────────────────────────────────────

    /// Registers a callback run after every mutating call.
    pub fn subscribe(&self, callback: impl Fn(&RuntimeEvent) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        write(&self.subscribers).push((id, Arc::new(callback)));
        id
    }

    /// Removes a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = write(&self.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    fn ensure_not_notifying(&self) -> RuntimeResult<()> {
        if self.notifying.load(Ordering::Acquire) {
            return Err(RuntimeError::Reentrant);
        }
        Ok(())
    }

    fn notify(&self, event: &RuntimeEvent) {
        // Snapshot so subscribers may (un)subscribe without deadlocking.
        let subscribers: Vec<Subscriber> = read(&self.subscribers)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        let _guard = NotifyGuard::enter(&self.notifying);
        for callback in subscribers {
            callback(event);
        }
    }
}

impl NodeLookup for Runtime {
    fn get_node(&self, prismic_id: &str) -> Option<Value> {
        Runtime::get_node(self, prismic_id)
    }
}

impl TypePathLookup for Runtime {
    fn get_type_path(&self, path: &[String]) -> Option<FieldKind> {
        Runtime::get_type_path(self, path)
    }
}

/// Clears the notification flag even if a subscriber panics.
struct NotifyGuard<'a>(&'a AtomicBool);

impl<'a> NotifyGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

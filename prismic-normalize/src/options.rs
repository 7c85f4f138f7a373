//! Configuration that changes how values are normalized.

use crate::imgix::{ImageUrlBuilder, ImgixUrlBuilder};
use prismic_model::FieldNameTransform;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Resolves a document link (or a document) to a URL.
pub type LinkResolver = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Renders one rich text element; `None` falls back to the default markup.
pub type ElementSerializer = Arc<dyn Fn(&HtmlElement<'_>) -> Option<String> + Send + Sync>;

/// Predicate deciding whether a file at a field path is downloaded.
pub type DownloadPredicate = Arc<dyn Fn(&[String], &Value) -> bool + Send + Sync>;

/// An element handed to an [`HtmlSerializer`].
#[derive(Debug)]
pub struct HtmlElement<'a> {
    /// Block or span type (`"heading1"`, `"hyperlink"`, `"group-list-item"`, ...).
    pub kind: &'a str,
    /// The raw block or span.
    pub node: &'a Value,
    /// Already rendered children.
    pub children: &'a str,
    /// Position of the element among its siblings.
    pub key: usize,
}

/// Custom rich text rendering.
#[derive(Clone)]
pub enum HtmlSerializer {
    /// One renderer per element type.
    Map(HashMap<String, ElementSerializer>),
    /// A single renderer receiving every element.
    Function(ElementSerializer),
}

impl HtmlSerializer {
    /// Wraps a closure as a single-function serializer.
    pub fn function(f: impl Fn(&HtmlElement<'_>) -> Option<String> + Send + Sync + 'static) -> Self {
        HtmlSerializer::Function(Arc::new(f))
    }

    pub(crate) fn serialize(&self, element: &HtmlElement<'_>) -> Option<String> {
        match self {
            HtmlSerializer::Map(map) => map.get(element.kind).and_then(|f| f(element)),
            HtmlSerializer::Function(f) => f(element),
        }
    }
}

impl fmt::Debug for HtmlSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HtmlSerializer::Map(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.debug_tuple("Map").field(&keys).finish()
            }
            HtmlSerializer::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// One entry of a download table.
#[derive(Clone)]
pub enum DownloadRule {
    Bool(bool),
    Function(DownloadPredicate),
}

impl<'de> Deserialize<'de> for DownloadRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(DownloadRule::Bool(bool::deserialize(deserializer)?))
    }
}

/// Whether Media links and images get their files downloaded.
///
/// Evaluated in order: a function decides for every field; a boolean applies
/// to every field; a table is looked up by the field's dotted path, and a
/// missing entry means no download.
#[derive(Clone)]
pub enum ShouldDownloadFiles {
    Function(DownloadPredicate),
    Bool(bool),
    Table(BTreeMap<String, DownloadRule>),
}

impl Default for ShouldDownloadFiles {
    fn default() -> Self {
        ShouldDownloadFiles::Bool(false)
    }
}

impl ShouldDownloadFiles {
    /// Wraps a closure as a download predicate.
    pub fn function(f: impl Fn(&[String], &Value) -> bool + Send + Sync + 'static) -> Self {
        ShouldDownloadFiles::Function(Arc::new(f))
    }

    /// Decides whether the file of the field at `path` is downloaded.
    pub fn should_download(&self, path: &[String], field: &Value) -> bool {
        match self {
            ShouldDownloadFiles::Function(f) => f(path, field),
            ShouldDownloadFiles::Bool(b) => *b,
            ShouldDownloadFiles::Table(table) => match table.get(&path.join(".")) {
                Some(DownloadRule::Function(f)) => f(path, field),
                Some(DownloadRule::Bool(b)) => *b,
                None => false,
            },
        }
    }
}

impl<'de> Deserialize<'de> for ShouldDownloadFiles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bool(bool),
            Table(BTreeMap<String, DownloadRule>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bool(b) => ShouldDownloadFiles::Bool(b),
            Repr::Table(table) => ShouldDownloadFiles::Table(table),
        })
    }
}

impl fmt::Debug for ShouldDownloadFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShouldDownloadFiles::Function(_) => f.write_str("Function(..)"),
            ShouldDownloadFiles::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            ShouldDownloadFiles::Table(table) => {
                f.debug_tuple("Table").field(&table.keys().collect::<Vec<_>>()).finish()
            }
        }
    }
}

/// What a document link's `document` field holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkedDocuments {
    /// The linked document itself, looked up through [`crate::NodeLookup`].
    #[default]
    Embed,
    /// The linked document's node id, left for the host to follow.
    NodeId,
}

/// Options read by every normalizer.
#[derive(Clone)]
pub struct NormalizeOptions {
    /// Inserted after `Prismic` in generated type names.
    pub type_prefix: Option<String>,
    /// Must be the transform the type paths were derived with.
    pub transform_field_name: FieldNameTransform,
    pub link_resolver: Option<LinkResolver>,
    pub html_serializer: Option<HtmlSerializer>,
    pub image_url_builder: Arc<dyn ImageUrlBuilder>,
    /// Merged over the default Imgix parameters for image URLs.
    pub image_imgix_params: Map<String, Value>,
    /// Merged over the default Imgix parameters for placeholder URLs.
    pub image_placeholder_imgix_params: Map<String, Value>,
    pub should_download_files: ShouldDownloadFiles,
    pub linked_documents: LinkedDocuments,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            type_prefix: None,
            transform_field_name: FieldNameTransform::default(),
            link_resolver: None,
            html_serializer: None,
            image_url_builder: Arc::new(ImgixUrlBuilder),
            image_imgix_params: Map::new(),
            image_placeholder_imgix_params: Map::new(),
            should_download_files: ShouldDownloadFiles::default(),
            linked_documents: LinkedDocuments::default(),
        }
    }
}

impl NormalizeOptions {
    /// Sets a link resolver.
    pub fn with_link_resolver(
        mut self,
        resolver: impl Fn(&Value) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.link_resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets an HTML serializer.
    pub fn with_html_serializer(mut self, serializer: HtmlSerializer) -> Self {
        self.html_serializer = Some(serializer);
        self
    }

    pub(crate) fn resolve_link(&self, link: &Value) -> Option<String> {
        self.link_resolver.as_ref().and_then(|resolve| resolve(link))
    }

    /// Default Imgix parameters merged with the configured overrides.
    pub fn imgix_params(&self) -> Map<String, Value> {
        merged(default_imgix_params(), &self.image_imgix_params)
    }

    /// Default placeholder parameters merged with the configured overrides.
    pub fn placeholder_params(&self) -> Map<String, Value> {
        merged(default_placeholder_params(), &self.image_placeholder_imgix_params)
    }
}

impl fmt::Debug for NormalizeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizeOptions")
            .field("type_prefix", &self.type_prefix)
            .field("transform_field_name", &self.transform_field_name)
            .field("link_resolver", &self.link_resolver.is_some())
            .field("html_serializer", &self.html_serializer)
            .field("image_imgix_params", &self.image_imgix_params)
            .field("image_placeholder_imgix_params", &self.image_placeholder_imgix_params)
            .field("should_download_files", &self.should_download_files)
            .field("linked_documents", &self.linked_documents)
            .finish_non_exhaustive()
    }
}

fn default_imgix_params() -> Map<String, Value> {
    match json!({"auto": "compress,format", "fit": "max", "q": 50}) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn default_placeholder_params() -> Map<String, Value> {
    match json!({"w": 100, "blur": 15, "q": 50}) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn merged(mut base: Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
    base
}

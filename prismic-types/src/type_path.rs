//! Type paths: a field's location mapped to its declared kind.
//!
//! A [`TypePathSet`] is populated once from the registered models, never
//! mutated while documents are normalized, and persisted at the end of a build
//! so a later process can rebuild it without the models.

use crate::digest::{sha256_hex, to_canonical_json_bytes};
use crate::{Error, FieldKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single `(path, kind)` entry.
///
/// `path` is a list of field-name segments, e.g.
/// `["page", "data", "body", "hero", "primary", "heading"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypePath {
    pub path: Vec<String>,
    pub kind: FieldKind,
}

impl TypePath {
    /// Creates a type path from any iterable of segments.
    pub fn new<I, S>(path: I, kind: FieldKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            kind,
        }
    }

    /// Dotted form of the path, used in logs and download tables.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// A registry of type paths keyed by exact path.
///
/// Paths are unique: inserting an existing path overwrites its kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePathSet {
    entries: BTreeMap<Vec<String>, FieldKind>,
}

impl TypePathSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a type path, returning the kind it replaced (if any).
    pub fn insert(&mut self, type_path: TypePath) -> Option<FieldKind> {
        self.entries.insert(type_path.path, type_path.kind)
    }

    /// Looks up the kind registered for an exact path.
    pub fn get(&self, path: &[String]) -> Option<&FieldKind> {
        self.entries.get(path)
    }

    /// Returns true if the exact path is registered.
    pub fn contains(&self, path: &[String]) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no paths are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = TypePath> + '_ {
        self.entries.iter().map(|(path, kind)| TypePath {
            path: path.clone(),
            kind: kind.clone(),
        })
    }

    /// Serializes the set as a JSON array of `{path, kind}`, sorted by path.
    pub fn to_json(&self) -> Result<String> {
        let entries: Vec<TypePath> = self.iter().collect();
        Ok(serde_json::to_string(&entries)?)
    }

    /// Parses a set from its JSON form.
    ///
    /// Accepts the array form written by [`TypePathSet::to_json`] as well as an
    /// object keyed by dotted path (`{"page.data.title": "StructuredText"}`).
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value {
            serde_json::Value::Array(_) => {
                let entries: Vec<TypePath> = serde_json::from_value(value)?;
                Ok(entries.into_iter().collect())
            }
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(dotted, kind)| {
                    let kind: FieldKind = serde_json::from_value(kind)?;
                    Ok(TypePath::new(dotted.split('.'), kind))
                })
                .collect(),
            other => Err(Error::InvalidTypePathFile(format!(
                "expected an array or object, found {other}"
            ))),
        }
    }

    /// Short content digest of the serialized set.
    pub fn digest(&self) -> Result<String> {
        let entries: Vec<TypePath> = self.iter().collect();
        let bytes = to_canonical_json_bytes(&entries)?;
        Ok(sha256_hex(&bytes)[..16].to_string())
    }

    /// Content-addressed filename for the serialized set.
    ///
    /// Identical sets always map to the same name, so a browser runtime can
    /// fetch the file by URL without coordinating with the build.
    pub fn filename(&self) -> Result<String> {
        Ok(format!("type-paths-{}.json", self.digest()?))
    }
}

impl FromIterator<TypePath> for TypePathSet {
    fn from_iter<T: IntoIterator<Item = TypePath>>(iter: T) -> Self {
        let mut set = TypePathSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<TypePath> for TypePathSet {
    fn extend<T: IntoIterator<Item = TypePath>>(&mut self, iter: T) {
        for type_path in iter {
            self.insert(type_path);
        }
    }
}

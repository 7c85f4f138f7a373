//! Content digests over canonical JSON.
//!
//! Canonical form: object keys deep-sorted, arrays in order, minified output.
//! The same value therefore always hashes to the same digest, which is what
//! node `contentDigest`s and content-addressed filenames rely on.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Convert a serializable value to canonical JSON bytes.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    let canon = canonicalize_value(v);
    serde_json::to_vec(&canon)
}

fn canonicalize_value(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut new_map = Map::with_capacity(entries.len());
            for (k, v) in entries {
                new_map.insert(k, canonicalize_value(v));
            }
            Value::Object(new_map)
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}

/// Return lowercase hex SHA-256 of bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest of a JSON value's canonical form.
///
/// Serializing a `serde_json::Value` cannot fail, so this is infallible.
pub fn content_digest(value: &Value) -> String {
    let canon = canonicalize_value(value.clone());
    sha256_hex(canon.to_string().as_bytes())
}

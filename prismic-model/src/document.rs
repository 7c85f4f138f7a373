use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document as delivered by the Prismic content API.
///
/// Not validated against a model: `data` is arbitrary JSON whose shape is only
/// checked when a type path matches during normalization. Keys this struct
/// does not name are kept in `extra` so nothing the API sends is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub document_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub alternate_languages: Vec<AlternateLanguage>,
    #[serde(default)]
    pub data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawDocument {
    /// Extract a string value from `data` using a JSON pointer (e.g., "/title").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.data.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract a boolean value from `data` using a JSON pointer.
    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.data.pointer(pointer).and_then(|v| v.as_bool())
    }

    /// Extract a numeric value from `data` using a JSON pointer.
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.data.pointer(pointer).and_then(|v| v.as_f64())
    }

    /// The document as a JSON value, the form the normalizer consumes.
    pub fn to_value(&self) -> Value {
        // Serializing a struct of strings, vectors and `Value`s cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A pointer to the same document in another locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateLanguage {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub document_type: String,
    pub lang: String,
}

//! Image URL derivation.
//!
//! Prismic serves images through Imgix, so transformations are plain query
//! parameters on the asset URL.

use serde_json::{Map, Value};

/// Builds a transformed image URL from a source URL and parameters.
pub trait ImageUrlBuilder: Send + Sync {
    fn build(&self, url: &str, params: &Map<String, Value>) -> String;
}

/// Merges parameters into the URL's query string.
///
/// Parameters already on the URL are kept unless overridden; a `null`
/// parameter removes the key.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImgixUrlBuilder;

impl ImageUrlBuilder for ImgixUrlBuilder {
    fn build(&self, url: &str, params: &Map<String, Value>) -> String {
        let (url, fragment) = match url.split_once('#') {
            Some((url, fragment)) => (url, Some(fragment)),
            None => (url, None),
        };
        let (base, query) = url.split_once('?').unwrap_or((url, ""));

        let mut pairs: Vec<(String, String)> = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();

        for (key, value) in params {
            match param_value(value) {
                Some(value) => match pairs.iter_mut().find(|(k, _)| k == key) {
                    Some(pair) => pair.1 = value,
                    None => pairs.push((key.clone(), value)),
                },
                None => pairs.retain(|(k, _)| k != key),
            }
        }

        let mut out = base.to_string();
        if !pairs.is_empty() {
            let query: Vec<String> = pairs
                .iter()
                .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
                .collect();
            out.push('?');
            out.push_str(&query.join("&"));
        }
        if let Some(fragment) = fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

fn param_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

// Imgix list parameters (`auto=compress,format`) read better unescaped.
fn encode(s: &str) -> String {
    urlencoding::encode(s).replace("%2C", ",")
}

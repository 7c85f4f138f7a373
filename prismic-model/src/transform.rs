use std::fmt;
use std::sync::Arc;

/// Maps a field id from a model to the path segment (and output key) used for
/// it.
///
/// The deriver and the normalizer must read the same value from the same
/// configuration; a mismatch makes every lookup below the renamed field miss.
#[derive(Clone, Default)]
pub enum FieldNameTransform {
    /// Replace `-` with `_` (GraphQL field names cannot contain dashes).
    #[default]
    Underscore,
    /// Use field ids verbatim.
    Identity,
    /// Caller-provided mapping.
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl FieldNameTransform {
    /// Wraps a closure as a custom transform.
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        FieldNameTransform::Custom(Arc::new(f))
    }

    /// Applies the transform to one field id.
    pub fn apply(&self, name: &str) -> String {
        match self {
            FieldNameTransform::Underscore => name.replace('-', "_"),
            FieldNameTransform::Identity => name.to_string(),
            FieldNameTransform::Custom(f) => f(name),
        }
    }
}

impl fmt::Debug for FieldNameTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldNameTransform::Underscore => f.write_str("Underscore"),
            FieldNameTransform::Identity => f.write_str("Identity"),
            FieldNameTransform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

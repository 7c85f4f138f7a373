use crate::deps::NormalizeDeps;
use crate::error::{NormalizeError, NormalizeResult};
use crate::rich_text::{as_html, as_text};
use serde_json::{json, Value};

/// Normalizes a StructuredText (rich text or title) field to
/// `{html, text, richText, raw}`.
///
/// An absent or empty field yields `null` html and text without consulting
/// the link resolver or the HTML serializer.
pub(crate) fn normalize_structured_text(
    path: &[String],
    value: &Value,
    deps: &NormalizeDeps<'_>,
) -> NormalizeResult<Value> {
    let blocks = match value {
        Value::Null => &[][..],
        Value::Array(blocks) => blocks.as_slice(),
        _ => return Err(NormalizeError::shape(path, "an array of rich text blocks")),
    };

    if blocks.is_empty() {
        return Ok(json!({
            "html": null,
            "text": null,
            "richText": value,
            "raw": value,
        }));
    }

    let resolve = |link: &Value| deps.options.resolve_link(link);
    let html = as_html(blocks, &resolve, deps.options.html_serializer.as_ref());

    Ok(json!({
        "html": html,
        "text": as_text(blocks),
        "richText": value,
        "raw": value,
    }))
}

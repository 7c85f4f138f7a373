use crate::deps::NormalizeDeps;
use crate::error::{NormalizeError, NormalizeResult};
use crate::imgix::ImageUrlBuilder;
use crate::node::local_file;
use serde_json::{json, Map, Value};

/// Keys describing the image itself; every other object-valued key is a
/// thumbnail.
const BASE_KEYS: [&str; 5] = ["url", "alt", "copyright", "dimensions", "edit"];

const FIXED_WIDTH: f64 = 400.0;
const FLUID_MAX_WIDTH: f64 = 800.0;
const FIXED_DENSITIES: [f64; 3] = [1.0, 1.5, 2.0];
const FLUID_FACTORS: [f64; 6] = [0.25, 0.5, 1.0, 1.5, 2.0, 3.0];

/// Normalizes an Image field.
///
/// The base image and each thumbnail go through [`image_fields`], so both
/// carry the same keys; thumbnails get an empty `thumbnails` map.
pub(crate) fn normalize_image(
    path: &[String],
    value: &Value,
    deps: &NormalizeDeps<'_>,
) -> NormalizeResult<Value> {
    let Value::Object(fields) = value else {
        return Err(NormalizeError::shape(path, "an image object"));
    };

    let thumbnails: Map<String, Value> = fields
        .iter()
        .filter(|(key, _)| !BASE_KEYS.contains(&key.as_str()))
        .filter_map(|(name, thumb)| {
            thumb
                .as_object()
                .map(|thumb| (name.clone(), Value::Object(image_fields(path, thumb, Map::new(), deps))))
        })
        .collect();

    Ok(Value::Object(image_fields(path, fields, thumbnails, deps)))
}

fn image_fields(
    path: &[String],
    image: &Map<String, Value>,
    thumbnails: Map<String, Value>,
    deps: &NormalizeDeps<'_>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for key in ["alt", "copyright", "dimensions"] {
        out.insert(key.into(), image.get(key).cloned().unwrap_or(Value::Null));
    }

    let source = image
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty());

    match source {
        Some(source) => {
            let builder = deps.options.image_url_builder.as_ref();
            let params = deps.options.imgix_params();
            let dimensions = dimensions(image);

            out.insert("url".into(), Value::String(builder.build(source, &params)));
            out.insert("fixed".into(), fixed(builder, source, &params, dimensions));
            out.insert("fluid".into(), fluid(builder, source, &params, dimensions));
            out.insert(
                "placeholder".into(),
                Value::String(builder.build(source, &deps.options.placeholder_params())),
            );
            out.insert(
                "localFile".into(),
                local_file(path, source, &Value::Object(image.clone()), deps),
            );
        }
        None => {
            for key in ["url", "fixed", "fluid", "placeholder", "localFile"] {
                out.insert(key.into(), Value::Null);
            }
        }
    }

    out.insert("thumbnails".into(), Value::Object(thumbnails));
    out
}

fn dimensions(image: &Map<String, Value>) -> Option<(f64, f64)> {
    let dimensions = image.get("dimensions")?;
    let width = dimensions.get("width")?.as_f64()?;
    let height = dimensions.get("height")?.as_f64()?;
    (width > 0.0 && height > 0.0).then_some((width, height))
}

fn with_size(params: &Map<String, Value>, width: f64, height: Option<f64>) -> Map<String, Value> {
    let mut params = params.clone();
    params.insert("w".into(), json!(width.round() as u64));
    if let Some(height) = height {
        params.insert("h".into(), json!(height.round() as u64));
    }
    params
}

/// Fixed-width helper: `{src, srcSet, width, height}` at 1x, 1.5x and 2x.
fn fixed(
    builder: &dyn ImageUrlBuilder,
    source: &str,
    params: &Map<String, Value>,
    dimensions: Option<(f64, f64)>,
) -> Value {
    let Some((width, height)) = dimensions else {
        return Value::Null;
    };
    let fixed_width = width.min(FIXED_WIDTH);
    let fixed_height = fixed_width * height / width;

    let src_set: Vec<String> = FIXED_DENSITIES
        .iter()
        .filter(|&&density| density == 1.0 || (fixed_width * density).round() <= width)
        .map(|density| {
            let url = builder.build(
                source,
                &with_size(params, fixed_width * density, Some(fixed_height * density)),
            );
            format!("{url} {density}x")
        })
        .collect();

    json!({
        "src": builder.build(source, &with_size(params, fixed_width, Some(fixed_height))),
        "srcSet": src_set.join(", "),
        "width": fixed_width.round() as u64,
        "height": fixed_height.round() as u64,
    })
}

/// Responsive helper: `{src, srcSet, aspectRatio, sizes}`.
fn fluid(
    builder: &dyn ImageUrlBuilder,
    source: &str,
    params: &Map<String, Value>,
    dimensions: Option<(f64, f64)>,
) -> Value {
    let Some((width, height)) = dimensions else {
        return Value::Null;
    };
    let max_width = width.min(FLUID_MAX_WIDTH);

    let mut widths: Vec<u64> = FLUID_FACTORS
        .iter()
        .map(|factor| (max_width * factor).round())
        .filter(|&w| w >= 1.0 && w <= width)
        .map(|w| w as u64)
        .collect();
    widths.dedup();

    let src_set: Vec<String> = widths
        .iter()
        .map(|&w| format!("{} {w}w", builder.build(source, &with_size(params, w as f64, None))))
        .collect();

    let max_width = max_width.round() as u64;
    json!({
        "src": builder.build(source, &with_size(params, max_width as f64, None)),
        "srcSet": src_set.join(", "),
        "aspectRatio": width / height,
        "sizes": format!("(max-width: {max_width}px) 100vw, {max_width}px"),
    })
}

//! Type path derivation.
//!
//! Walks a model once and emits one [`TypePath`] per addressable location.
//! The normalizer later dispatches on these paths without re-reading the
//! model, so every segment built here must match the one the normalizer
//! builds from the document: field ids go through the shared
//! [`FieldNameTransform`], slice choice ids are used verbatim (they are matched
//! against `slice_type` at runtime).

use crate::schema::{CustomTypeModel, FieldModel, SharedSliceModel};
use crate::transform::FieldNameTransform;
use prismic_types::{FieldKind, TypePath};
use std::collections::BTreeMap;

/// Derives every type path declared by a Custom Type model.
///
/// Always emits `Document` at `[id]` and `AlternateLanguages` at
/// `[id, "alternate_languages"]`. `DocumentData` at `[id, "data"]` is emitted
/// only when the model has a field other than the UID, which is rendered on
/// the document itself rather than under `data`.
pub fn derive_custom_type_type_paths(
    model: &CustomTypeModel,
    transform: &FieldNameTransform,
) -> Vec<TypePath> {
    let mut out = vec![
        TypePath::new([model.id.as_str()], FieldKind::Document),
        TypePath::new([model.id.as_str(), "alternate_languages"], FieldKind::AlternateLanguages),
    ];

    let fields = model.fields();
    let has_data = fields.values().any(|field| field.kind != FieldKind::Uid);
    if has_data {
        out.push(TypePath::new([model.id.as_str(), "data"], FieldKind::DocumentData));
    }

    let data_path = vec![model.id.clone(), "data".to_string()];
    for (field_id, field) in fields {
        derive_field(child(&data_path, transform.apply(field_id)), field, transform, &mut out);
    }

    out
}

/// Derives every type path declared by a Shared Slice model.
///
/// Each variation is addressed as `[slice_id, variation_id]`, which is the
/// path the normalizer builds from a slice's `slice_type` and `variation`.
pub fn derive_shared_slice_type_paths(
    model: &SharedSliceModel,
    transform: &FieldNameTransform,
) -> Vec<TypePath> {
    let mut out = Vec::new();

    for variation in &model.variations {
        let path = vec![model.id.clone(), variation.id.clone()];
        out.push(TypePath::new(path.clone(), FieldKind::SharedSliceVariation));
        derive_slice_zones(&path, &variation.primary, &variation.items, transform, &mut out);
    }

    out
}

fn derive_field(
    path: Vec<String>,
    field: &FieldModel,
    transform: &FieldNameTransform,
    out: &mut Vec<TypePath>,
) {
    match &field.kind {
        // Rendered directly on the document.
        FieldKind::Uid => {}

        // Modeled and derived separately from their own Shared Slice model.
        FieldKind::SharedSlice => {}

        FieldKind::Group => {
            out.push(TypePath::new(path.clone(), FieldKind::Group));
            for (sub_id, sub) in &field.config.fields {
                derive_field(child(&path, transform.apply(sub_id)), sub, transform, out);
            }
        }

        FieldKind::SliceZone => {
            out.push(TypePath::new(path.clone(), FieldKind::SliceZone));
            for (choice_id, choice) in &field.config.choices {
                if choice.kind == FieldKind::Slice {
                    derive_field(child(&path, choice_id.clone()), choice, transform, out);
                }
            }
        }

        FieldKind::Slice => {
            out.push(TypePath::new(path.clone(), FieldKind::Slice));
            derive_slice_zones(&path, &field.non_repeat, &field.repeat, transform, out);
        }

        leaf => out.push(TypePath::new(path, leaf.clone())),
    }
}

fn derive_slice_zones(
    path: &[String],
    primary: &BTreeMap<String, FieldModel>,
    items: &BTreeMap<String, FieldModel>,
    transform: &FieldNameTransform,
    out: &mut Vec<TypePath>,
) {
    let primary_path = child(path, "primary".to_string());
    for (name, field) in primary {
        derive_field(child(&primary_path, transform.apply(name)), field, transform, out);
    }

    let items_path = child(path, "items".to_string());
    for (name, field) in items {
        derive_field(child(&items_path, transform.apply(name)), field, transform, out);
    }
}

fn child(path: &[String], segment: String) -> Vec<String> {
    let mut next = Vec::with_capacity(path.len() + 1);
    next.extend_from_slice(path);
    next.push(segment);
    next
}

use pretty_assertions::assert_eq;
use prismic_types::{FieldKind, TypePath, TypePathSet};
use proptest::prelude::*;

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

fn sample_set() -> TypePathSet {
    [
        TypePath::new(["page"], FieldKind::Document),
        TypePath::new(["page", "data"], FieldKind::DocumentData),
        TypePath::new(["page", "data", "title"], FieldKind::StructuredText),
        TypePath::new(["page", "data", "body"], FieldKind::SliceZone),
    ]
    .into_iter()
    .collect()
}

// ── Registry ──────────────────────────────────────────────────────

#[test]
fn lookup_by_exact_path() {
    let set = sample_set();
    assert_eq!(
        set.get(&path(&["page", "data", "title"])),
        Some(&FieldKind::StructuredText)
    );
    assert_eq!(set.get(&path(&["page", "data"])), Some(&FieldKind::DocumentData));
    assert!(set.get(&path(&["page", "data", "missing"])).is_none());
    assert!(set.get(&path(&["data", "title"])).is_none());
}

#[test]
fn reinsert_overwrites_kind() {
    let mut set = sample_set();
    let previous = set.insert(TypePath::new(["page", "data", "title"], FieldKind::Text));
    assert_eq!(previous, Some(FieldKind::StructuredText));
    assert_eq!(set.get(&path(&["page", "data", "title"])), Some(&FieldKind::Text));
    assert_eq!(set.len(), 4);
}

#[test]
fn dotted_path() {
    let tp = TypePath::new(["page", "data", "title"], FieldKind::StructuredText);
    assert_eq!(tp.dotted(), "page.data.title");
}

// ── Serialization ─────────────────────────────────────────────────

#[test]
fn serializes_as_sorted_array() {
    let json = sample_set().to_json().unwrap();
    assert_eq!(
        json,
        r#"[{"path":["page"],"kind":"Document"},{"path":["page","data"],"kind":"DocumentData"},{"path":["page","data","body"],"kind":"Slices"},{"path":["page","data","title"],"kind":"StructuredText"}]"#
    );
}

#[test]
fn parses_object_form() {
    let set = TypePathSet::from_json(r#"{"page":"Document","page.data.title":"StructuredText"}"#)
        .unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(
        set.get(&path(&["page", "data", "title"])),
        Some(&FieldKind::StructuredText)
    );
}

#[test]
fn rejects_scalar_file() {
    assert!(TypePathSet::from_json("42").is_err());
    assert!(TypePathSet::from_json("not json").is_err());
}

#[test]
fn filename_is_content_addressed() {
    let a = sample_set().filename().unwrap();
    let b = sample_set().filename().unwrap();
    assert_eq!(a, b);
    assert!(a.starts_with("type-paths-"));
    assert!(a.ends_with(".json"));

    let mut changed = sample_set();
    changed.insert(TypePath::new(["page", "data", "extra"], FieldKind::Text));
    assert_ne!(changed.filename().unwrap(), a);
}

// ── Properties ────────────────────────────────────────────────────

fn kind_strategy() -> impl Strategy<Value = FieldKind> {
    prop_oneof![
        Just(FieldKind::Boolean),
        Just(FieldKind::Image),
        Just(FieldKind::Link),
        Just(FieldKind::StructuredText),
        Just(FieldKind::Group),
        Just(FieldKind::SliceZone),
        Just(FieldKind::Slice),
        Just(FieldKind::SharedSliceVariation),
        Just(FieldKind::Document),
        Just(FieldKind::DocumentData),
        "[A-Z][a-zA-Z]{2,10}".prop_map(FieldKind::from),
    ]
}

fn type_path_strategy() -> impl Strategy<Value = TypePath> {
    (prop::collection::vec("[a-z_]{1,8}", 1..6), kind_strategy())
        .prop_map(|(path, kind)| TypePath { path, kind })
}

proptest! {
    #[test]
    fn serialization_roundtrip(entries in prop::collection::vec(type_path_strategy(), 0..40)) {
        let set: TypePathSet = entries.into_iter().collect();
        let json = set.to_json().unwrap();
        let back = TypePathSet::from_json(&json).unwrap();
        prop_assert_eq!(back, set);
    }

    #[test]
    fn filename_ignores_insertion_order(entries in prop::collection::vec(type_path_strategy(), 0..20)) {
        let forward: TypePathSet = entries.iter().cloned().collect();
        let mut deduped: Vec<TypePath> = Vec::new();
        for tp in entries.iter().rev() {
            if !deduped.iter().any(|d| d.path == tp.path) {
                deduped.push(tp.clone());
            }
        }
        let reverse: TypePathSet = deduped.into_iter().collect();
        prop_assert_eq!(forward.filename().unwrap(), reverse.filename().unwrap());
    }
}

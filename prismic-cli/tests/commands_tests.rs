use pretty_assertions::assert_eq;
use prismic_cli::{derive_type_paths, load_models, merge_files, write_type_paths};
use prismic_runtime::MergeStrategy;
use prismic_source::FieldNameStyle;
use prismic_types::{FieldKind, TypePathSet};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn path(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

fn models_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("page.json"),
        json!({
            "id": "page",
            "json": {"Main": {
                "uid": {"type": "UID", "config": {}},
                "hero-title": {"type": "StructuredText", "config": {}}
            }}
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.path().join("slices.json"),
        json!([{
            "id": "hero",
            "variations": [{"id": "default", "primary": {"heading": {"type": "Text", "config": {}}}, "items": {}}]
        }])
        .to_string(),
    )
    .unwrap();
    fs::write(dir.path().join("README.md"), "not a model").unwrap();
    dir
}

// ── Models ──────────────────────────────────────────────────────

#[test]
fn load_models_sorts_custom_types_and_slices() {
    let dir = models_dir();
    let models = load_models(dir.path()).unwrap();

    assert_eq!(models.custom_types.len(), 1);
    assert_eq!(models.custom_types[0].id, "page");
    assert_eq!(models.shared_slices.len(), 1);
    assert_eq!(models.shared_slices[0].id, "hero");
}

#[test]
fn invalid_model_names_the_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.json"), "[1, 2]").unwrap();

    let err = load_models(dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("broken.json"));
}

#[test]
fn missing_models_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(load_models(&dir.path().join("nope")).is_err());
}

// ── Derive ──────────────────────────────────────────────────────

#[test]
fn derive_writes_content_addressed_file() {
    let models_dir = models_dir();
    let out = TempDir::new().unwrap();
    let models = load_models(models_dir.path()).unwrap();
    let type_paths = derive_type_paths(&models, FieldNameStyle::Underscore);

    assert_eq!(
        type_paths.get(&path(&["page", "data", "hero_title"])),
        Some(&FieldKind::StructuredText)
    );
    assert_eq!(
        type_paths.get(&path(&["hero", "default", "primary", "heading"])),
        Some(&FieldKind::Text)
    );

    let written = write_type_paths(&type_paths, &out.path().join("static")).unwrap();
    assert_eq!(
        written.file_name().unwrap().to_str().unwrap(),
        type_paths.filename().unwrap()
    );
    let read_back = TypePathSet::from_json(&fs::read_to_string(&written).unwrap()).unwrap();
    assert_eq!(read_back, type_paths);
}

#[test]
fn same_models_give_same_filename() {
    let dir = models_dir();
    let models = load_models(dir.path()).unwrap();
    let first = derive_type_paths(&models, FieldNameStyle::Underscore);
    let second = derive_type_paths(&models, FieldNameStyle::Underscore);
    assert_eq!(first.filename().unwrap(), second.filename().unwrap());

    let identity = derive_type_paths(&models, FieldNameStyle::Identity);
    assert_ne!(first.filename().unwrap(), identity.filename().unwrap());
}

// ── Merge ───────────────────────────────────────────────────────

#[test]
fn merge_files_deep_merges_same_type() {
    let dir = TempDir::new().unwrap();
    let static_path = dir.path().join("static.json");
    let preview_path = dir.path().join("preview.json");
    fs::write(
        &static_path,
        json!({"prismicPage": {"data": {"title": "Old", "footer": "Kept"}}}).to_string(),
    )
    .unwrap();
    fs::write(&preview_path, json!({"prismicPage": {"data": {"title": "New"}}}).to_string()).unwrap();

    let merged = merge_files(&static_path, &preview_path, MergeStrategy::Auto).unwrap();
    assert_eq!(
        merged,
        json!({"prismicPage": {"data": {"title": "New", "footer": "Kept"}}})
    );
}

#[test]
fn merge_files_reports_invalid_json() {
    let dir = TempDir::new().unwrap();
    let static_path = dir.path().join("static.json");
    let preview_path = dir.path().join("preview.json");
    fs::write(&static_path, "{}").unwrap();
    fs::write(&preview_path, "{oops").unwrap();

    let err = merge_files(&static_path, &preview_path, MergeStrategy::Auto).unwrap_err();
    assert!(format!("{err:#}").contains("preview.json"));
}

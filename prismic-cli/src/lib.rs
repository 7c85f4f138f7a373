//! Commands of the `prismic` binary, kept in a library so they can be tested
//! without spawning the process.

pub mod server;

use anyhow::{bail, Context, Result};
use prismic_model::{
    derive_custom_type_type_paths, derive_shared_slice_type_paths, CustomTypeModel,
    FieldNameTransform, SharedSliceModel,
};
use prismic_runtime::{merge_preview_data, MergeStrategy};
use prismic_source::{
    source_nodes, FieldNameStyle, HttpDownloader, MemoryHost, NodeHost, PluginOptions,
    PrismicClient,
};
use prismic_types::TypePathSet;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use server::{build_router, is_type_paths_filename, ServeState};

/// Models found in a directory.
#[derive(Debug, Default)]
pub struct Models {
    pub custom_types: Vec<CustomTypeModel>,
    pub shared_slices: Vec<SharedSliceModel>,
}

/// Reads every `*.json` file of `dir`.
///
/// A file holds one model or an array of models. Objects with `variations`
/// are Shared Slice models; everything else is a Custom Type model.
pub fn load_models(dir: &Path) -> Result<Models> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read models directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut models = Models::default();
    for path in paths {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;

        let entries = match value {
            Value::Array(items) => items,
            other => vec![other],
        };
        for entry in entries {
            add_model(&mut models, entry).with_context(|| format!("Invalid model in {}", path.display()))?;
        }
    }

    debug!(
        "Loaded {} custom types and {} shared slices",
        models.custom_types.len(),
        models.shared_slices.len()
    );
    Ok(models)
}

fn add_model(models: &mut Models, value: Value) -> Result<()> {
    if !value.is_object() {
        bail!("model is not an object");
    }
    if value.get("variations").is_some() {
        models.shared_slices.push(serde_json::from_value(value)?);
    } else {
        models.custom_types.push(serde_json::from_value(value)?);
    }
    Ok(())
}

/// Derives the type paths of every model.
pub fn derive_type_paths(models: &Models, style: FieldNameStyle) -> TypePathSet {
    let transform = FieldNameTransform::from(style);
    let mut set = TypePathSet::new();
    for model in &models.custom_types {
        set.extend(derive_custom_type_type_paths(model, &transform));
    }
    for model in &models.shared_slices {
        set.extend(derive_shared_slice_type_paths(model, &transform));
    }
    set
}

/// Writes the type path file into `out_dir` under its content-addressed name.
pub fn write_type_paths(type_paths: &TypePathSet, out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let path = out_dir.join(type_paths.filename()?);
    fs::write(&path, type_paths.to_json()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} type paths to {}", type_paths.len(), path.display());
    Ok(path)
}

/// What `source` produced.
#[derive(Debug)]
pub struct SourceSummary {
    pub documents: usize,
    pub nodes: usize,
    pub nodes_file: PathBuf,
    pub type_paths_file: PathBuf,
}

/// Sources the repository described by the config file into `out_dir`:
/// `nodes.json`, the type path file, and downloaded files under `files/`.
pub async fn run_source(config: &Path, out_dir: &Path) -> Result<SourceSummary> {
    let text = fs::read_to_string(config)
        .with_context(|| format!("Failed to read config {}", config.display()))?;
    let options = PluginOptions::from_json(&text).context("Invalid plugin options")?;

    let client = PrismicClient::from_options(&options)?;
    let host = MemoryHost::new();
    let downloader = HttpDownloader::new(out_dir.join("files"))?;

    info!("Sourcing repository {}", options.repository_name);
    let report = source_nodes(&options, &client, &host, &downloader)
        .await
        .with_context(|| format!("Failed to source repository {}", options.repository_name))?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let nodes = host.get_nodes();
    let nodes_file = out_dir.join("nodes.json");
    fs::write(&nodes_file, serde_json::to_string_pretty(&nodes)?)
        .with_context(|| format!("Failed to write {}", nodes_file.display()))?;

    let type_paths_file = write_type_paths(&report.type_paths, out_dir)?;

    Ok(SourceSummary {
        documents: report.documents,
        nodes: nodes.len(),
        nodes_file,
        type_paths_file,
    })
}

/// Merges a preview payload file into a static data file.
pub fn merge_files(static_path: &Path, preview_path: &Path, strategy: MergeStrategy) -> Result<Value> {
    let static_data = read_json(static_path)?;
    let preview = read_json(preview_path)?;
    Ok(merge_preview_data(&static_data, &preview, strategy))
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

//! Plugin options.
//!
//! Read from the JSON config file (camelCase keys, every key optional except
//! `repositoryName`) and turned into the client settings, the type path set
//! and the [`NormalizeOptions`] the rest of the crate works with.

use crate::error::{SourceError, SourceResult};
use prismic_model::{
    derive_custom_type_type_paths, derive_shared_slice_type_paths, CustomTypeModel, FieldModel,
    FieldNameTransform, SharedSliceModel,
};
use prismic_normalize::{LinkedDocuments, NormalizeOptions, ShouldDownloadFiles};
use prismic_types::TypePathSet;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Tab name → field id → field model.
pub type ModelTabs = BTreeMap<String, BTreeMap<String, FieldModel>>;

/// How model field ids become output keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldNameStyle {
    #[default]
    Underscore,
    Identity,
}

impl From<FieldNameStyle> for FieldNameTransform {
    fn from(style: FieldNameStyle) -> Self {
        match style {
            FieldNameStyle::Underscore => FieldNameTransform::Underscore,
            FieldNameStyle::Identity => FieldNameTransform::Identity,
        }
    }
}

/// Options of one Prismic source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginOptions {
    pub repository_name: String,
    pub access_token: Option<String>,
    /// Defaults to `https://<repositoryName>.cdn.prismic.io/api/v2`.
    pub api_endpoint: Option<String>,
    /// Sources the documents of this release instead of the master ref.
    pub release_id: Option<String>,
    pub lang: String,
    pub fetch_links: Vec<String>,
    pub graph_query: Option<String>,
    pub type_prefix: Option<String>,
    pub webhook_secret: Option<String>,
    pub transform_field_name: FieldNameStyle,
    pub image_imgix_params: Map<String, Value>,
    pub image_placeholder_imgix_params: Map<String, Value>,
    pub should_download_files: ShouldDownloadFiles,
    pub custom_type_models: Vec<CustomTypeModel>,
    pub shared_slice_models: Vec<SharedSliceModel>,
    /// Legacy form of `customTypeModels`: custom type id → tabs.
    pub schemas: BTreeMap<String, ModelTabs>,
    /// Where a preview fetches the type path file written at build time.
    pub type_paths_url: Option<String>,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            repository_name: String::new(),
            access_token: None,
            api_endpoint: None,
            release_id: None,
            lang: "*".to_string(),
            fetch_links: Vec::new(),
            graph_query: None,
            type_prefix: None,
            webhook_secret: None,
            transform_field_name: FieldNameStyle::default(),
            image_imgix_params: Map::new(),
            image_placeholder_imgix_params: Map::new(),
            should_download_files: ShouldDownloadFiles::default(),
            custom_type_models: Vec::new(),
            shared_slice_models: Vec::new(),
            schemas: BTreeMap::new(),
            type_paths_url: None,
        }
    }
}

impl PluginOptions {
    /// Options for `repository_name` with everything else defaulted.
    pub fn new(repository_name: impl Into<String>) -> Self {
        Self {
            repository_name: repository_name.into(),
            ..Default::default()
        }
    }

    /// Parses options from a JSON document.
    pub fn from_json(json: &str) -> SourceResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Rejects options no source can run with.
    pub fn validate(&self) -> SourceResult<()> {
        if self.repository_name.trim().is_empty() {
            return Err(SourceError::Config("repositoryName is required".to_string()));
        }
        if self.graph_query.is_some() && !self.fetch_links.is_empty() {
            return Err(SourceError::Config(
                "graphQuery and fetchLinks cannot be used together".to_string(),
            ));
        }
        Ok(())
    }

    /// The REST API v2 endpoint.
    pub fn api_endpoint(&self) -> String {
        match &self.api_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}.cdn.prismic.io/api/v2", self.repository_name),
        }
    }

    /// Every Custom Type model, including the legacy `schemas` entries.
    pub fn all_custom_type_models(&self) -> Vec<CustomTypeModel> {
        let mut models = self.custom_type_models.clone();
        for (id, tabs) in &self.schemas {
            if models.iter().any(|m| &m.id == id) {
                continue;
            }
            models.push(CustomTypeModel::from_tabs(id.clone(), tabs.clone()));
        }
        models
    }

    /// Derives the type paths of every configured model.
    pub fn type_paths(&self) -> TypePathSet {
        let transform = FieldNameTransform::from(self.transform_field_name);
        let mut set = TypePathSet::new();
        for model in self.all_custom_type_models() {
            set.extend(derive_custom_type_type_paths(&model, &transform));
        }
        for model in &self.shared_slice_models {
            set.extend(derive_shared_slice_type_paths(model, &transform));
        }
        set
    }

    /// Normalization options matching these plugin options.
    pub fn to_normalize_options(&self, linked_documents: LinkedDocuments) -> NormalizeOptions {
        NormalizeOptions {
            type_prefix: self.type_prefix.clone(),
            transform_field_name: self.transform_field_name.into(),
            image_imgix_params: self.image_imgix_params.clone(),
            image_placeholder_imgix_params: self.image_placeholder_imgix_params.clone(),
            should_download_files: self.should_download_files.clone(),
            linked_documents,
            ..NormalizeOptions::default()
        }
    }
}

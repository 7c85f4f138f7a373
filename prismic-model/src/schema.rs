use prismic_types::FieldKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A Custom Type model: one document type's fields, grouped in tabs.
///
/// Matches the shape returned by the Custom Types API:
/// `{"id": "page", "label": "Page", "repeatable": true, "json": {"Main": {...}}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomTypeModel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub repeatable: bool,
    /// Tab name → field id → field model.
    pub json: BTreeMap<String, BTreeMap<String, FieldModel>>,
    #[serde(default = "default_status")]
    pub status: bool,
}

fn default_status() -> bool {
    true
}

impl CustomTypeModel {
    /// Builds a model from the bare tab JSON (the legacy `schemas` option,
    /// keyed by custom type id).
    pub fn from_tabs(id: impl Into<String>, json: BTreeMap<String, BTreeMap<String, FieldModel>>) -> Self {
        Self {
            id: id.into(),
            label: None,
            repeatable: true,
            json,
            status: true,
        }
    }

    /// All fields with the tab layer discarded.
    ///
    /// Tabs are purely organizational; a field id repeated in a later tab
    /// replaces the earlier one.
    pub fn fields(&self) -> BTreeMap<&str, &FieldModel> {
        self.json
            .values()
            .flat_map(|tab| tab.iter().map(|(id, field)| (id.as_str(), field)))
            .collect()
    }

    /// Returns the UID field id, if the model declares one.
    pub fn uid_field(&self) -> Option<&str> {
        self.fields()
            .into_iter()
            .find(|(_, field)| field.kind == FieldKind::Uid)
            .map(|(id, _)| id)
    }
}

/// A field declared in a model.
///
/// Slice zone choices are also `FieldModel`s (`"type": "Slice"` with
/// `non-repeat`/`repeat` maps, or `"type": "SharedSlice"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldModel {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fieldset: Option<String>,
    #[serde(default)]
    pub config: FieldConfig,
    /// Slice choice: fields of the non-repeatable zone (`primary`).
    #[serde(rename = "non-repeat", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub non_repeat: BTreeMap<String, FieldModel>,
    /// Slice choice: fields of the repeatable zone (`items`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub repeat: BTreeMap<String, FieldModel>,
}

impl FieldModel {
    /// Shorthand for a field with an empty config.
    pub fn of_kind(kind: FieldKind) -> Self {
        Self {
            kind,
            fieldset: None,
            config: FieldConfig::default(),
            non_repeat: BTreeMap::new(),
            repeat: BTreeMap::new(),
        }
    }

    /// Shorthand for a group field.
    pub fn group(fields: BTreeMap<String, FieldModel>) -> Self {
        Self {
            config: FieldConfig {
                fields,
                ..FieldConfig::default()
            },
            ..Self::of_kind(FieldKind::Group)
        }
    }

    /// Shorthand for a slice zone field.
    pub fn slice_zone(choices: BTreeMap<String, FieldModel>) -> Self {
        Self {
            config: FieldConfig {
                choices,
                ..FieldConfig::default()
            },
            ..Self::of_kind(FieldKind::SliceZone)
        }
    }

    /// Shorthand for a (non-shared) slice choice.
    pub fn slice(
        non_repeat: BTreeMap<String, FieldModel>,
        repeat: BTreeMap<String, FieldModel>,
    ) -> Self {
        Self {
            non_repeat,
            repeat,
            ..Self::of_kind(FieldKind::Slice)
        }
    }
}

/// Kind-specific configuration of a field.
///
/// Only the keys that affect derivation are typed; everything else (labels,
/// placeholders, thumbnail constraints, ...) is kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Group: subfields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldModel>,
    /// Slice zone: choice id → slice model.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub choices: BTreeMap<String, FieldModel>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A Shared Slice model with its variations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedSliceModel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub variations: Vec<SharedSliceVariationModel>,
}

/// One variation of a Shared Slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedSliceVariationModel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub primary: BTreeMap<String, FieldModel>,
    #[serde(default)]
    pub items: BTreeMap<String, FieldModel>,
}

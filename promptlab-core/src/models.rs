//! Experiment and organization records
//!
//! Plain data shared by the store, the autogenerator and the settings page.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Variable label -> assigned value
pub type VariableValues = BTreeMap<String, String>;

/// Output of scenario autogeneration. Empty when nothing could be generated.
pub type GeneratedScenario = VariableValues;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// Fields that may change on an organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Payload of the organization update call: `{id, updates: {name}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUpdate {
    pub id: String,
    pub updates: OrganizationUpdates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub experiment_id: String,
    pub label: String,
}

impl TemplateVariable {
    /// The `{{label}}` token this variable is written as inside prompt text
    pub fn placeholder(&self) -> String {
        format!("{{{{{}}}}}", self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestScenario {
    pub experiment_id: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub sort_index: i32,
    #[serde(default, deserialize_with = "lenient_values")]
    pub variable_values: VariableValues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVariant {
    pub experiment_id: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub sort_index: i32,
    /// Provider request config. Opaque JSON; only its serialized text is inspected.
    pub config: serde_json::Value,
}

fn default_visible() -> bool {
    true
}

/// Text form of a stored or generated value.
///
/// Strings are kept, numbers and booleans become their JSON text. Null,
/// arrays and objects have no text form.
pub fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn lenient_values<'de, D>(deserializer: D) -> Result<VariableValues, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Map<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(label, value)| scalar_text(value).map(|text| (label, text)))
        .collect())
}

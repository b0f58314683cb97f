use crate::validation::ValidationRule;
use pagesmith_model::{Interaction, Props, StyleRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Editor-facing type of a declared prop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Image,
    Color,
    Link,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub prop_type: PropType,
    /// Informational for editor UIs; enforcement goes through `validation`
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropSchema {
    pub fn new(name: impl Into<String>, prop_type: PropType) -> Self {
        Self {
            name: name.into(),
            prop_type,
            required: false,
            default: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// A placeable component kind
///
/// Read-only once registered. Instances point back at a definition through
/// `ComponentInstance::component_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_width")]
    pub default_width: f64,
    #[serde(default = "default_height")]
    pub default_height: f64,
    #[serde(default)]
    pub default_styles: Vec<StyleRecord>,
    #[serde(default)]
    pub props: Vec<PropSchema>,
    #[serde(default)]
    pub validation: BTreeMap<String, ValidationRule>,
    /// Kinds that should already be on the page when this one is added
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Interactions copied onto every new instance
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    /// Instances of a nestable kind carry a `children` list
    #[serde(default)]
    pub nestable: bool,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_width() -> f64 {
    200.0
}

fn default_height() -> f64 {
    100.0
}

impl ComponentDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            tags: Vec::new(),
            icon: None,
            description: String::new(),
            version: default_version(),
            default_width: default_width(),
            default_height: default_height(),
            default_styles: Vec::new(),
            props: Vec::new(),
            validation: BTreeMap::new(),
            dependencies: Vec::new(),
            interactions: Vec::new(),
            nestable: false,
        }
    }

    /// Prop bag holding every declared default
    pub fn default_props(&self) -> Props {
        self.props
            .iter()
            .filter_map(|schema| schema.default.clone().map(|value| (schema.name.clone(), value)))
            .collect()
    }

    pub fn prop(&self, name: &str) -> Option<&PropSchema> {
        self.props.iter().find(|p| p.name == name)
    }

    /// Case-insensitive match over name, id, category and tags
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.id.to_lowercase().contains(&query)
            || self.category.to_lowercase().contains(&query)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
    }
}

//! # Pagesmith Registry
//!
//! Read-only catalog of everything a page can be built from: component kinds
//! ([`ComponentDefinition`]), [`Theme`]s and page templates. A registry is
//! filled once at startup (built-in seed plus an optional JSON seed) and then
//! only read, so it can be shared across threads behind an `Arc` without
//! locking.

pub mod builtin;
pub mod definition;
pub mod resolve;
pub mod theme;
pub mod validation;

pub use definition::*;
pub use resolve::ResolvedNode;
pub use theme::*;
pub use validation::*;

use pagesmith_model::{ComponentInstance, Page, Point, Position, Props, Visibility};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Component kind not found: {0}")]
    UnknownComponent(String),

    #[error("Theme not found: {0}")]
    UnknownTheme(String),

    #[error("Template not found: {0}")]
    UnknownTemplate(String),

    #[error("Invalid registry seed: {0}")]
    Seed(#[from] serde_json::Error),
}

/// JSON shape accepted by [`Registry::extend`]
///
/// Templates are keyed by their slug.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySeed {
    #[serde(default)]
    pub components: Vec<ComponentDefinition>,
    #[serde(default)]
    pub themes: Vec<Theme>,
    #[serde(default)]
    pub templates: Vec<Page>,
}

impl RegistrySeed {
    pub fn from_json(source: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(source)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    components: BTreeMap<String, ComponentDefinition>,
    themes: BTreeMap<String, Theme>,
    templates: BTreeMap<String, Page>,
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in kinds, themes and templates
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for definition in builtin::components() {
            registry.register_component(definition);
        }
        for theme in builtin::themes() {
            registry.register_theme(theme);
        }
        for template in builtin::templates(&registry) {
            registry.register_template(template);
        }

        info!(
            components = registry.components.len(),
            themes = registry.themes.len(),
            templates = registry.templates.len(),
            "Initialized built-in registry"
        );
        registry
    }

    /// Add (or replace) everything in `seed`
    pub fn extend(&mut self, seed: RegistrySeed) {
        let counts = (seed.components.len(), seed.themes.len(), seed.templates.len());
        seed.components.into_iter().for_each(|d| self.register_component(d));
        seed.themes.into_iter().for_each(|t| self.register_theme(t));
        seed.templates.into_iter().for_each(|t| self.register_template(t));

        info!(
            components = counts.0,
            themes = counts.1,
            templates = counts.2,
            "Loaded registry seed"
        );
    }

    pub fn register_component(&mut self, definition: ComponentDefinition) {
        self.components.insert(definition.id.clone(), definition);
    }

    pub fn register_theme(&mut self, theme: Theme) {
        self.themes.insert(theme.id.clone(), theme);
    }

    pub fn register_template(&mut self, template: Page) {
        self.templates.insert(template.slug.clone(), template);
    }

    pub fn component(&self, kind_id: &str) -> Option<&ComponentDefinition> {
        self.components.get(kind_id)
    }

    pub fn theme(&self, theme_id: &str) -> Option<&Theme> {
        self.themes.get(theme_id)
    }

    pub fn template(&self, template_id: &str) -> Option<&Page> {
        self.templates.get(template_id)
    }

    pub fn require_component(&self, kind_id: &str) -> Result<&ComponentDefinition, RegistryError> {
        self.component(kind_id)
            .ok_or_else(|| RegistryError::UnknownComponent(kind_id.to_string()))
    }

    /// Kinds, optionally filtered by category, sorted by display name
    pub fn available_components(&self, category: Option<&str>) -> Vec<&ComponentDefinition> {
        let mut list: Vec<&ComponentDefinition> = self
            .components
            .values()
            .filter(|d| category.map_or(true, |c| d.category == c))
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    pub fn component_categories(&self) -> Vec<String> {
        let categories: BTreeSet<&str> = self.components.values().map(|d| d.category.as_str()).collect();
        categories.into_iter().map(String::from).collect()
    }

    pub fn search_components(&self, query: &str) -> Vec<&ComponentDefinition> {
        let mut list: Vec<&ComponentDefinition> =
            self.components.values().filter(|d| d.matches_query(query)).collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    /// Templates as `(key, page)`, optionally filtered by tag
    pub fn available_templates(&self, tag: Option<&str>) -> Vec<(&str, &Page)> {
        self.templates
            .iter()
            .filter(|(_, page)| tag.map_or(true, |t| page.tags.contains(t)))
            .map(|(key, page)| (key.as_str(), page))
            .collect()
    }

    pub fn available_themes(&self) -> Vec<&Theme> {
        self.themes.values().collect()
    }

    /// Build a fresh instance of `kind_id`: declared default props overlaid by
    /// `overrides`, default styles and interactions copied, default size
    pub fn instantiate(
        &self,
        kind_id: &str,
        id: impl Into<String>,
        overrides: Props,
        at: Point,
        z_index: i64,
    ) -> Result<ComponentInstance, RegistryError> {
        let definition = self.require_component(kind_id)?;

        let mut props = definition.default_props();
        props.extend(overrides);

        let mut position = Position::new(at.x, at.y, definition.default_width, definition.default_height, z_index);
        position.rotation = Some(0.0);
        position.scale = Some(1.0);

        Ok(ComponentInstance {
            id: id.into(),
            component_id: definition.id.clone(),
            name: definition.name.clone(),
            props,
            styles: definition.default_styles.clone(),
            interactions: definition.interactions.clone(),
            children: definition.nestable.then(Vec::new),
            position,
            visibility: Visibility::default(),
            animation: None,
            responsive: None,
            locked: false,
            grouped: None,
        })
    }

    /// Validate a prop bag against the kind's rules (unknown kinds have none)
    pub fn validate_props(&self, kind_id: &str, props: &Props) -> Result<(), ValidationError> {
        match self.component(kind_id) {
            Some(definition) => validate_props(props, &definition.validation),
            None => Ok(()),
        }
    }

    /// Declared dependencies of `kind_id` with no instance on `page`
    pub fn missing_dependencies(&self, kind_id: &str, page: &Page) -> Vec<String> {
        let Some(definition) = self.component(kind_id) else {
            return Vec::new();
        };
        definition
            .dependencies
            .iter()
            .filter(|dep| !page.components.iter().any(|c| &c.component_id == *dep))
            .cloned()
            .collect()
    }
}

use crate::component::{Animation, ComponentInstance, ResponsiveOverrides};
use crate::style::StyleRecord;
use crate::Props;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Top-level aggregate a user edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub layout: Layout,
    #[serde(default)]
    pub components: Vec<ComponentInstance>,
    #[serde(default)]
    pub styles: Vec<StyleRecord>,
    pub settings: PageSettings,
    pub metadata: PageMetadata,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Page this one was duplicated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Group id → display name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<String, String>,
}

impl Page {
    /// Blank page with an empty root container
    pub fn blank(id: impl Into<String>, name: impl Into<String>, slug: impl Into<String>, now: DateTime<Utc>) -> Self {
        let name = name.into();

        Self {
            id: id.into(),
            slug: slug.into(),
            layout: Layout::root(),
            components: Vec::new(),
            styles: Vec::new(),
            settings: PageSettings::default(),
            metadata: PageMetadata {
                title: name.clone(),
                ..PageMetadata::default()
            },
            name,
            version: 1,
            created_at: now,
            updated_at: now,
            is_published: false,
            published_at: None,
            parent_id: None,
            tags: BTreeSet::new(),
            groups: BTreeMap::new(),
        }
    }

    /// Stamp `updated_at`, never moving it before `created_at`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    /// Case-insensitive match over name, slug, title, description and tags
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.slug.to_lowercase().contains(&query)
            || self.metadata.title.to_lowercase().contains(&query)
            || self.metadata.description.to_lowercase().contains(&query)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Container,
    Grid,
    Flex,
    Canvas,
    Section,
    Column,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::Container => "container",
            LayoutKind::Grid => "grid",
            LayoutKind::Flex => "flex",
            LayoutKind::Canvas => "canvas",
            LayoutKind::Section => "section",
            LayoutKind::Column => "column",
        }
    }
}

/// Structural container at the root of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayoutKind,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub styles: Vec<StyleRecord>,
    #[serde(default)]
    pub responsive: ResponsiveOverrides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<LayoutConstraints>,
}

impl Layout {
    pub fn new(id: impl Into<String>, kind: LayoutKind) -> Self {
        Self {
            id: id.into(),
            kind,
            props: Props::new(),
            children: Vec::new(),
            styles: Vec::new(),
            responsive: ResponsiveOverrides::default(),
            animation: None,
            constraints: None,
        }
    }

    /// Default root container for blank pages
    pub fn root() -> Self {
        let mut layout = Self::new("root", LayoutKind::Container);
        layout.props = props(json!({ "padding": "20px" }));
        layout.responsive = ResponsiveOverrides {
            desktop: Some(props(json!({ "maxWidth": "1200px", "margin": "0 auto" }))),
            tablet: Some(props(json!({ "maxWidth": "768px", "margin": "0 auto" }))),
            mobile: Some(props(json!({ "maxWidth": "100%", "margin": "0 auto" }))),
        };
        layout
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    Visible,
    Hidden,
    Scroll,
    Auto,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub sticky: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow: Option<Overflow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    pub responsive: bool,
    pub seo: bool,
    pub accessibility: bool,
    pub performance: bool,
    pub theme: String,
    #[serde(default, rename = "customCSS", skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
    #[serde(default, rename = "customJS", skip_serializing_if = "Option::is_none")]
    pub custom_js: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    pub language: String,
    #[serde(default)]
    pub rtl: bool,
    #[serde(default)]
    pub preloader: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<AnalyticsSettings>,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            responsive: true,
            seo: true,
            accessibility: true,
            performance: true,
            theme: "modern-dark".to_string(),
            custom_css: None,
            custom_js: None,
            favicon: None,
            language: "en".to_string(),
            rtl: false,
            preloader: false,
            analytics: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_analytics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook_pixel: Option<String>,
    #[serde(default)]
    pub custom_events: Vec<CustomEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    pub name: String,
    pub trigger: String,
    #[serde(default)]
    pub data: Props,
}

/// SEO and social-share metadata, emitted verbatim by the HTML target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(default)]
    pub no_index: bool,
    #[serde(default)]
    pub no_follow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<Value>,
}

/// Build a prop bag from a `json!` object literal (anything else yields an empty bag)
pub fn props(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        _ => Props::new(),
    }
}

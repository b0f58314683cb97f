use crate::style::{Breakpoint, StyleRecord};
use crate::Props;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One placed component on a page
///
/// `component_id` is a lookup key into the component registry, not an
/// ownership edge. `grouped` is a relation: any number of instances may share
/// one group id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    pub id: String,
    pub component_id: String,
    pub name: String,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub styles: Vec<StyleRecord>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    /// Present only for nestable kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    pub position: Position,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<ResponsiveOverrides>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouped: Option<String>,
}

impl ComponentInstance {
    pub fn is_nestable(&self) -> bool {
        self.children.is_some()
    }

    pub fn child_ids(&self) -> &[String] {
        self.children.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl Position {
    pub fn new(x: f64, y: f64, width: f64, height: f64, z_index: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            z_index,
            rotation: None,
            scale: None,
        }
    }
}

/// Caller-supplied drop point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visibility {
    pub desktop: bool,
    pub tablet: bool,
    pub mobile: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Visibility {
    pub fn is_visible(&self, breakpoint: Breakpoint) -> bool {
        match breakpoint {
            Breakpoint::Desktop => self.desktop,
            Breakpoint::Tablet => self.tablet,
            Breakpoint::Mobile => self.mobile,
        }
    }

    /// Utility classes hiding the component at each disabled breakpoint
    pub fn hidden_classes(&self) -> Vec<String> {
        Breakpoint::ALL
            .iter()
            .filter(|bp| !self.is_visible(**bp))
            .map(|bp| format!("hidden-{}", bp))
            .collect()
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            desktop: true,
            tablet: true,
            mobile: true,
            conditions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub field: String,
    pub operator: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<LogicalOperator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Fade,
    Slide,
    Scale,
    Rotate,
    Bounce,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationTrigger {
    Load,
    Scroll,
    Hover,
    Click,
    Viewport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationDirection {
    Normal,
    Reverse,
    Alternate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Milliseconds
    pub duration: u32,
    /// Milliseconds
    #[serde(default)]
    pub delay: u32,
    pub easing: String,
    pub trigger: AnimationTrigger,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<AnimationDirection>,
}

/// Per-breakpoint property overrides (`{ "maxWidth": "768px" }`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<Props>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet: Option<Props>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<Props>,
}

impl ResponsiveOverrides {
    pub fn for_breakpoint(&self, breakpoint: Breakpoint) -> Option<&Props> {
        match breakpoint {
            Breakpoint::Desktop => self.desktop.as_ref(),
            Breakpoint::Tablet => self.tablet.as_ref(),
            Breakpoint::Mobile => self.mobile.as_ref(),
        }
    }
}

/// Declarative trigger/effect pair, executed by the renderer, never by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: String,
    pub event: String,
    pub actions: Vec<InteractionAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub prevent_default: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stop_propagation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub target: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Props>,
}

use pagesmith_common::to_kebab_case;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Responsive tier a style record may be scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Desktop,
    Tablet,
    Mobile,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Breakpoint::Desktop, Breakpoint::Tablet, Breakpoint::Mobile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Desktop => "desktop",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interaction state a style record may be scoped to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleState {
    #[default]
    Default,
    Hover,
    Active,
    Focus,
    Disabled,
}

impl StyleState {
    /// CSS pseudo-class for this state (`None` for the default state)
    pub fn pseudo_class(&self) -> Option<&'static str> {
        match self {
            StyleState::Default => None,
            StyleState::Hover => Some(":hover"),
            StyleState::Active => Some(":active"),
            StyleState::Focus => Some(":focus"),
            StyleState::Disabled => Some(":disabled"),
        }
    }
}

/// A single CSS-like declaration, optionally scoped to a breakpoint and/or state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    pub property: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<Breakpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StyleState>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub important: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl StyleRecord {
    pub fn new(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            breakpoint: None,
            state: None,
            important: false,
            unit: None,
        }
    }

    pub fn at(mut self, breakpoint: Breakpoint) -> Self {
        self.breakpoint = Some(breakpoint);
        self
    }

    pub fn on(mut self, state: StyleState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn scope(&self) -> StyleScope {
        StyleScope {
            breakpoint: self.breakpoint,
            state: self.state.unwrap_or_default(),
        }
    }

    /// Rendered value, with `unit` appended to numeric values
    pub fn css_value(&self) -> String {
        let unit = self.unit.as_deref().unwrap_or("");
        match &self.value {
            Value::String(s) if !unit.is_empty() && s.parse::<f64>().is_ok() => format!("{}{}", s, unit),
            Value::String(s) => s.clone(),
            Value::Number(n) => format!("{}{}", n, unit),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn to_declaration(&self) -> Declaration {
        Declaration {
            property: self.property.clone(),
            value: self.css_value(),
            important: self.important,
        }
    }
}

/// Where a block of declarations applies
///
/// `breakpoint: None` is the unscoped base block that applies at every width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleScope {
    pub breakpoint: Option<Breakpoint>,
    pub state: StyleState,
}

impl StyleScope {
    pub const BASE: StyleScope = StyleScope {
        breakpoint: None,
        state: StyleState::Default,
    };
}

/// A resolved `property: value` pair
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    /// `backgroundColor` + `#fff` → `background-color: #fff;`
    pub fn to_css(&self) -> String {
        format!(
            "{}: {}{};",
            to_kebab_case(&self.property),
            self.value,
            if self.important { " !important" } else { "" }
        )
    }
}

/// Style records folded into one declaration block per scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyles {
    blocks: BTreeMap<StyleScope, Vec<Declaration>>,
}

impl ResolvedStyles {
    /// Group records by scope; a later record overrides an earlier one on the
    /// same property unless only the earlier one is `important`
    pub fn resolve(records: &[StyleRecord]) -> Self {
        let mut resolved = Self::default();
        for record in records {
            resolved.push(record.scope(), record.to_declaration());
        }
        resolved
    }

    pub fn push(&mut self, scope: StyleScope, declaration: Declaration) {
        merge_declaration(self.blocks.entry(scope).or_default(), declaration);
    }

    /// Fold a responsive override map (`{ "maxWidth": "768px" }`) into a breakpoint block
    pub fn apply_overrides(&mut self, breakpoint: Breakpoint, overrides: &crate::Props) {
        let scope = StyleScope {
            breakpoint: Some(breakpoint),
            state: StyleState::Default,
        };
        for (property, value) in overrides {
            let record = StyleRecord::new(property.clone(), value.clone());
            self.push(scope, record.to_declaration());
        }
    }

    pub fn block(&self, scope: StyleScope) -> &[Declaration] {
        self.blocks.get(&scope).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Blocks in cascade order: base first, then desktop, tablet, mobile
    pub fn blocks(&self) -> impl Iterator<Item = (StyleScope, &[Declaration])> {
        self.blocks
            .iter()
            .filter(|(_, decls)| !decls.is_empty())
            .map(|(scope, decls)| (*scope, decls.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.values().all(Vec::is_empty)
    }
}

/// Effective declarations for one breakpoint/state: the ordered merge of every
/// record that is unscoped or scoped to exactly that breakpoint/state
pub fn effective_styles(
    records: &[StyleRecord],
    breakpoint: Breakpoint,
    state: StyleState,
) -> Vec<Declaration> {
    let mut block = Vec::new();
    for record in records {
        let breakpoint_matches = record.breakpoint.map_or(true, |bp| bp == breakpoint);
        let record_state = record.state.unwrap_or_default();
        let state_matches = record_state == StyleState::Default || record_state == state;
        if breakpoint_matches && state_matches {
            merge_declaration(&mut block, record.to_declaration());
        }
    }
    block
}

fn merge_declaration(block: &mut Vec<Declaration>, declaration: Declaration) {
    match block.iter_mut().find(|d| d.property == declaration.property) {
        Some(existing) if existing.important && !declaration.important => {}
        Some(existing) => *existing = declaration,
        None => block.push(declaration),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_later_record_wins() {
        let records = vec![
            StyleRecord::new("color", "red"),
            StyleRecord::new("padding", "4px"),
            StyleRecord::new("color", "blue"),
        ];
        let resolved = ResolvedStyles::resolve(&records);
        let base = resolved.block(StyleScope::BASE);

        assert_eq!(base.len(), 2);
        assert_eq!(base[0].property, "color");
        assert_eq!(base[0].value, "blue");
    }

    #[test]
    fn test_important_always_wins() {
        let records = vec![
            StyleRecord::new("color", "red").important(),
            StyleRecord::new("color", "blue"),
        ];
        let resolved = ResolvedStyles::resolve(&records);
        let base = resolved.block(StyleScope::BASE);

        assert_eq!(base[0].value, "red");
        assert_eq!(base[0].to_css(), "color: red !important;");
    }

    #[test]
    fn test_blocks_split_by_scope() {
        let records = vec![
            StyleRecord::new("padding", 16).with_unit("px"),
            StyleRecord::new("padding", 8).with_unit("px").at(Breakpoint::Mobile),
            StyleRecord::new("opacity", 0.8).on(StyleState::Hover),
        ];
        let resolved = ResolvedStyles::resolve(&records);
        let scopes: Vec<StyleScope> = resolved.blocks().map(|(scope, _)| scope).collect();

        assert_eq!(scopes.len(), 3);
        assert_eq!(scopes[0], StyleScope::BASE);
        assert_eq!(
            resolved.block(StyleScope { breakpoint: Some(Breakpoint::Mobile), state: StyleState::Default })[0].value,
            "8px"
        );
    }

    #[test]
    fn test_effective_styles_cascade() {
        let records = vec![
            StyleRecord::new("color", "black"),
            StyleRecord::new("color", "gray").at(Breakpoint::Tablet),
            StyleRecord::new("color", "white").at(Breakpoint::Mobile),
            StyleRecord::new("color", "red").on(StyleState::Hover),
        ];

        let tablet = effective_styles(&records, Breakpoint::Tablet, StyleState::Default);
        assert_eq!(tablet[0].value, "gray");

        let tablet_hover = effective_styles(&records, Breakpoint::Tablet, StyleState::Hover);
        assert_eq!(tablet_hover[0].value, "red");

        let desktop = effective_styles(&records, Breakpoint::Desktop, StyleState::Default);
        assert_eq!(desktop[0].value, "black");
    }

    #[test]
    fn test_css_value_units() {
        assert_eq!(StyleRecord::new("width", 200).with_unit("px").css_value(), "200px");
        assert_eq!(StyleRecord::new("width", "50").with_unit("%").css_value(), "50%");
        assert_eq!(StyleRecord::new("width", "auto").with_unit("px").css_value(), "auto");
        assert_eq!(StyleRecord::new("display", json!("grid")).css_value(), "grid");
    }

    #[test]
    fn test_record_json_shape() {
        let record = StyleRecord::new("gap", "2rem").at(Breakpoint::Tablet);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json, json!({ "property": "gap", "value": "2rem", "breakpoint": "tablet" }));
    }
}

//! Stylesheet generation for a page.
//!
//! Every style record lands in one block per (selector, breakpoint, state).
//! Unscoped blocks apply at every width; breakpoint blocks are wrapped in the
//! theme's media queries and always come after the base rules, ordered
//! desktop → tablet → mobile so the narrower tier wins where they overlap.

use pagesmith_model::{
    Breakpoint, ComponentInstance, Declaration, Layout, LayoutKind, Page, ResolvedStyles, StyleRecord, StyleScope,
};
use pagesmith_registry::{Theme, ThemeBreakpoints};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_FONT_FAMILY: &str = "Arial, sans-serif";

/// CSS rule with selector and declarations
#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
    /// `None` applies at every width
    pub breakpoint: Option<Breakpoint>,
}

/// Ordered collection of rules plus the widths their media queries use
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
    pub breakpoints: ThemeBreakpoints,
}

impl Stylesheet {
    pub fn new(breakpoints: ThemeBreakpoints) -> Self {
        Self {
            rules: Vec::new(),
            breakpoints,
        }
    }

    /// Add a rule; empty rules are dropped
    pub fn add_rule(&mut self, selector: impl Into<String>, declarations: Vec<Declaration>, breakpoint: Option<Breakpoint>) {
        if declarations.is_empty() {
            return;
        }
        self.rules.push(CssRule {
            selector: selector.into(),
            declarations,
            breakpoint,
        });
    }

    /// Add every non-empty block of `resolved` under `selector`
    pub fn add_resolved(&mut self, selector: &str, resolved: &ResolvedStyles) {
        for (scope, declarations) in resolved.blocks() {
            let selector = match scope.state.pseudo_class() {
                Some(pseudo) => format!("{}{}", selector, pseudo),
                None => selector.to_string(),
            };
            self.add_rule(selector, declarations.to_vec(), scope.breakpoint);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule with this exact selector and breakpoint
    pub fn find(&self, selector: &str, breakpoint: Option<Breakpoint>) -> Option<&CssRule> {
        self.rules
            .iter()
            .find(|r| r.selector == selector && r.breakpoint == breakpoint)
    }

    /// Convert to CSS text
    pub fn to_css(&self) -> String {
        let mut groups: BTreeMap<Option<Breakpoint>, Vec<&CssRule>> = BTreeMap::new();
        for rule in &self.rules {
            groups.entry(rule.breakpoint).or_default().push(rule);
        }

        let mut css = String::new();
        for (breakpoint, rules) in groups {
            match breakpoint {
                None => {
                    for rule in rules {
                        write_rule(&mut css, rule, "");
                        css.push('\n');
                    }
                }
                Some(bp) => {
                    css.push_str(&media_query(bp, &self.breakpoints));
                    css.push_str(" {\n");
                    for rule in rules {
                        write_rule(&mut css, rule, "  ");
                    }
                    css.push_str("}\n\n");
                }
            }
        }
        css
    }
}

fn write_rule(css: &mut String, rule: &CssRule, indent: &str) {
    css.push_str(indent);
    css.push_str(&rule.selector);
    css.push_str(" {\n");
    for declaration in &rule.declarations {
        css.push_str(indent);
        css.push_str("  ");
        css.push_str(&declaration.to_css());
        css.push('\n');
    }
    css.push_str(indent);
    css.push_str("}\n");
}

/// `@media` prelude for one tier
///
/// Desktop starts one pixel above the tablet width; tablet and mobile are
/// upper bounds.
pub fn media_query(breakpoint: Breakpoint, breakpoints: &ThemeBreakpoints) -> String {
    match breakpoint {
        Breakpoint::Desktop => format!("@media (min-width: {}px)", breakpoints.tablet + 1),
        Breakpoint::Tablet => format!("@media (max-width: {}px)", breakpoints.tablet),
        Breakpoint::Mobile => format!("@media (max-width: {}px)", breakpoints.mobile),
    }
}

pub fn component_class(id: &str) -> String {
    format!("component-{}", id)
}

pub fn layout_class(id: &str) -> String {
    format!("layout-{}", id)
}

/// What goes into the sheet besides per-component rules
#[derive(Debug, Clone, Copy)]
pub struct CssOptions {
    /// Reset, `:root` custom properties and `body` font
    pub document: bool,
    /// `.hidden-<tier>` visibility helpers
    pub utilities: bool,
}

impl CssOptions {
    /// Component-level rules only, for embedding in a scoped style block
    pub fn scoped() -> Self {
        Self {
            document: false,
            utilities: false,
        }
    }
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            document: true,
            utilities: true,
        }
    }
}

pub fn build_stylesheet(page: &Page, theme: Option<&Theme>, options: &CssOptions) -> Stylesheet {
    let breakpoints = theme.map(|t| t.breakpoints).unwrap_or_default();
    let mut sheet = Stylesheet::new(breakpoints);

    if options.document {
        document_rules(&mut sheet, theme);
    }

    sheet.add_resolved(".builder-page", &ResolvedStyles::resolve(&page.styles));
    sheet.add_resolved(&format!(".{}", layout_class(&page.layout.id)), &layout_styles(&page.layout));

    let absolute = page.layout.kind == LayoutKind::Canvas;
    for component in page.tree_order() {
        let resolved = component_styles(component, absolute);
        sheet.add_resolved(&format!(".{}", component_class(&component.id)), &resolved);
    }

    if options.utilities {
        for bp in Breakpoint::ALL {
            let hide = Declaration {
                property: "display".to_string(),
                value: "none".to_string(),
                important: true,
            };
            sheet.add_rule(format!(".hidden-{}", bp), vec![hide], Some(bp));
        }
    }

    debug!(page_id = %page.id, rules = sheet.rules.len(), "Built stylesheet");
    sheet
}

/// Compile a page's styles to CSS text
pub fn compile_to_css(page: &Page, theme: Option<&Theme>, options: &CssOptions) -> String {
    build_stylesheet(page, theme, options).to_css()
}

fn declaration(property: &str, value: impl Into<String>) -> Declaration {
    Declaration {
        property: property.to_string(),
        value: value.into(),
        important: false,
    }
}

fn document_rules(sheet: &mut Stylesheet, theme: Option<&Theme>) {
    sheet.add_rule("*", vec![declaration("boxSizing", "border-box")], None);

    if let Some(theme) = theme {
        let vars = theme
            .custom_properties()
            .into_iter()
            .map(|(name, value)| declaration(&name, value))
            .collect();
        sheet.add_rule(":root", vars, None);
    }

    let font = theme.map_or_else(|| DEFAULT_FONT_FAMILY.to_string(), Theme::font_family);
    sheet.add_rule(
        "body",
        vec![
            declaration("margin", "0"),
            declaration("padding", "0"),
            declaration("fontFamily", font),
        ],
        None,
    );
    sheet.add_rule(".builder-page", vec![declaration("minHeight", "100vh")], None);
}

/// Layout props become base declarations; grid/flex kinds set `display`
fn layout_styles(layout: &Layout) -> ResolvedStyles {
    let mut resolved = ResolvedStyles::default();

    match layout.kind {
        LayoutKind::Grid => resolved.push(StyleScope::BASE, declaration("display", "grid")),
        LayoutKind::Flex => resolved.push(StyleScope::BASE, declaration("display", "flex")),
        LayoutKind::Canvas => resolved.push(StyleScope::BASE, declaration("position", "relative")),
        _ => {}
    }

    for (key, value) in &layout.props {
        if !matches!(value, Value::String(_) | Value::Number(_)) {
            continue;
        }
        let property = match (layout.kind, key.as_str()) {
            (LayoutKind::Grid, "columns") => "gridTemplateColumns",
            _ => key.as_str(),
        };
        resolved.push(StyleScope::BASE, StyleRecord::new(property, value.clone()).to_declaration());
    }

    for record in &layout.styles {
        resolved.push(record.scope(), record.to_declaration());
    }
    for bp in Breakpoint::ALL {
        if let Some(overrides) = layout.responsive.for_breakpoint(bp) {
            resolved.apply_overrides(bp, overrides);
        }
    }

    resolved
}

fn component_styles(component: &ComponentInstance, absolute: bool) -> ResolvedStyles {
    let mut resolved = ResolvedStyles::default();

    if absolute {
        let p = &component.position;
        resolved.push(StyleScope::BASE, declaration("position", "absolute"));
        resolved.push(StyleScope::BASE, declaration("left", format!("{}px", p.x)));
        resolved.push(StyleScope::BASE, declaration("top", format!("{}px", p.y)));
        resolved.push(StyleScope::BASE, declaration("width", format!("{}px", p.width)));
        resolved.push(StyleScope::BASE, declaration("height", format!("{}px", p.height)));
        resolved.push(StyleScope::BASE, declaration("zIndex", p.z_index.to_string()));

        let mut transforms = Vec::new();
        if let Some(rotation) = p.rotation.filter(|r| *r != 0.0) {
            transforms.push(format!("rotate({}deg)", rotation));
        }
        if let Some(scale) = p.scale.filter(|s| *s != 1.0) {
            transforms.push(format!("scale({})", scale));
        }
        if !transforms.is_empty() {
            resolved.push(StyleScope::BASE, declaration("transform", transforms.join(" ")));
        }
    }

    for record in &component.styles {
        resolved.push(record.scope(), record.to_declaration());
    }
    if let Some(responsive) = &component.responsive {
        for bp in Breakpoint::ALL {
            if let Some(overrides) = responsive.for_breakpoint(bp) {
                resolved.apply_overrides(bp, overrides);
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pagesmith_model::{props, Point, Props, StyleState};
    use pagesmith_registry::Registry;
    use serde_json::json;

    fn page_with_hero() -> Page {
        let registry = Registry::builtin();
        let mut page = Page::blank("p-1", "Home", "home", Utc::now());
        let mut hero = registry
            .instantiate("hero", "h1", Props::new(), Point::default(), 1)
            .unwrap();
        hero.styles.push(StyleRecord::new("padding", "2rem").at(Breakpoint::Mobile));
        hero.styles.push(StyleRecord::new("opacity", 0.9).on(StyleState::Hover));
        page.layout.children.push(hero.id.clone());
        page.components.push(hero);
        page
    }

    #[test]
    fn test_compile_component_blocks() {
        let page = page_with_hero();
        let registry = Registry::builtin();
        let css = compile_to_css(&page, registry.theme("modern-dark"), &CssOptions::default());

        println!("Generated CSS:\n{}", css);

        assert!(css.contains(".component-h1 {\n  padding: 4rem;\n  text-align: center;\n  background-color: #000;\n}"));
        assert!(css.contains(".component-h1:hover {\n  opacity: 0.9;\n}"));
        let mobile = css.find("@media (max-width: 768px)").unwrap();
        let mobile_rule = css.find("  .component-h1 {\n    padding: 2rem;\n  }").unwrap();
        assert!(mobile < mobile_rule);
        assert!(css.contains("font-family: Inter, sans-serif;"));
        assert!(css.contains("--color-accent: #ff6b35;"));
    }

    #[test]
    fn test_media_blocks_follow_base_rules() {
        let page = page_with_hero();
        let css = compile_to_css(&page, None, &CssOptions::default());

        let base = css.find(".component-h1 {").unwrap();
        let desktop = css.find("@media (min-width: 1025px)").unwrap();
        let tablet = css.find("@media (max-width: 1024px)").unwrap();
        let mobile = css.find("@media (max-width: 768px)").unwrap();

        assert!(base < desktop);
        assert!(desktop < tablet);
        assert!(tablet < mobile);
        assert!(css.contains("font-family: Arial, sans-serif;"));
    }

    #[test]
    fn test_utilities_and_scoped_mode() {
        let page = page_with_hero();

        let full = build_stylesheet(&page, None, &CssOptions::default());
        let hidden = full.find(".hidden-tablet", Some(Breakpoint::Tablet)).unwrap();
        assert_eq!(hidden.declarations[0].to_css(), "display: none !important;");

        let scoped = build_stylesheet(&page, None, &CssOptions::scoped());
        assert!(scoped.find("body", None).is_none());
        assert!(scoped.find(".hidden-tablet", Some(Breakpoint::Tablet)).is_none());
        assert!(scoped.find(".component-h1", None).is_some());
    }

    #[test]
    fn test_layout_rules() {
        let mut page = Page::blank("p-1", "Blog", "blog", Utc::now());
        page.layout.kind = LayoutKind::Grid;
        page.layout.props = props(json!({ "columns": "1fr 300px", "gap": "40px", "fullWidth": true }));
        page.layout.responsive.desktop = None;
        page.layout.responsive.tablet = Some(props(json!({ "gridTemplateColumns": "1fr" })));
        page.layout.responsive.mobile = None;

        let sheet = build_stylesheet(&page, None, &CssOptions::scoped());
        let base = sheet.find(".layout-root", None).unwrap();
        let css: Vec<String> = base.declarations.iter().map(Declaration::to_css).collect();

        assert!(css.contains(&"display: grid;".to_string()));
        assert!(css.contains(&"grid-template-columns: 1fr 300px;".to_string()));
        assert!(!css.iter().any(|d| d.starts_with("full-width")));

        let tablet = sheet.find(".layout-root", Some(Breakpoint::Tablet)).unwrap();
        assert_eq!(tablet.declarations[0].to_css(), "grid-template-columns: 1fr;");
    }

    #[test]
    fn test_canvas_layout_positions_absolutely() {
        let mut page = page_with_hero();
        page.layout.kind = LayoutKind::Canvas;
        if let Some(hero) = page.component_mut("h1") {
            hero.position.x = 40.0;
            hero.position.rotation = Some(15.0);
        }

        let sheet = build_stylesheet(&page, None, &CssOptions::scoped());
        let rule = sheet.find(".component-h1", None).unwrap();
        let css: Vec<String> = rule.declarations.iter().map(Declaration::to_css).collect();

        assert!(css.contains(&"position: absolute;".to_string()));
        assert!(css.contains(&"left: 40px;".to_string()));
        assert!(css.contains(&"transform: rotate(15deg);".to_string()));
    }

    #[test]
    fn test_empty_page_has_no_component_rules() {
        let mut page = Page::blank("p-1", "Empty", "empty", Utc::now());
        page.layout.props = Props::new();
        page.layout.responsive = Default::default();

        let sheet = build_stylesheet(&page, None, &CssOptions::scoped());
        assert!(sheet.is_empty());
    }
}

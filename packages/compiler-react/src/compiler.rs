use crate::context::{CompileOptions, CompilerContext};
use pagesmith_compiler_css::{compile_to_css, CssOptions};
use pagesmith_common::to_pascal_case;
use pagesmith_model::{
    effective_styles, Animation, AnimationKind, AnimationTrigger, Breakpoint, Layout, LayoutKind, Page, StyleRecord,
    StyleState,
};
use pagesmith_registry::{Registry, ResolvedNode};
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Failed to serialize embedded data: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Compile a page to a React function component module
///
/// The component is named after the page slug and carries the page metadata
/// as a static `metadata` property.
#[instrument(skip_all, fields(page_id = %page.id))]
pub fn compile_to_react(page: &Page, registry: &Registry, options: CompileOptions) -> Result<String, CompileError> {
    let ctx = CompilerContext::new(options);
    let tree = registry.resolve_tree(page);

    let imports: BTreeSet<String> = tree
        .iter()
        .flat_map(|root| root.walk())
        .map(element_name)
        .collect();

    let mut component_name = to_pascal_case(&page.slug);
    if imports.contains(&component_name) {
        component_name.push_str("Page");
    }

    compile_imports(&imports, &ctx);
    if ctx.options.embed_styles {
        let css_options = CssOptions {
            document: false,
            utilities: true,
        };
        let css = compile_to_css(page, registry.theme(&page.settings.theme), &css_options);
        ctx.add_line(&format!("const pageStyles = `\n{}`;", template_literal(&css)));
        ctx.add("\n");
    }

    ctx.add_line(&format!("// Generated component for {}", page.name));
    if ctx.options.use_typescript {
        ctx.add_line(&format!("export function {}(): JSX.Element {{", component_name));
    } else {
        ctx.add_line(&format!("export function {}() {{", component_name));
    }
    ctx.indent();
    ctx.add_line("return (");
    ctx.indent();

    let page_styles = inline_styles(&page.styles, &ctx);
    ctx.add_line("<div");
    ctx.indent();
    ctx.add_line("className=\"builder-page\"");
    ctx.add_line(&format!("data-page-id={}", jsx_string(&page.id)));
    if !page_styles.is_empty() {
        ctx.add_line(&format!("style={}", style_object(&page_styles)));
    }
    ctx.dedent();
    ctx.add_line(">");
    ctx.indent();
    if ctx.options.embed_styles {
        ctx.add_line("<style>{pageStyles}</style>");
    }

    compile_layout(&page.layout, &tree, &ctx)?;

    ctx.dedent();
    ctx.add_line("</div>");
    ctx.dedent();
    ctx.add_line(");");
    ctx.dedent();
    ctx.add_line("}");
    ctx.add("\n");

    ctx.add_line(&format!("{}.displayName = {};", component_name, jsx_string(&page.name)));
    ctx.add_block(
        &format!("{}.metadata = ", component_name),
        &serde_json::to_string_pretty(&page.metadata)?,
        ";",
    );
    ctx.add("\n");
    ctx.add_line(&format!("export default {};", component_name));

    debug!(component = %component_name, "Compiled React component");
    Ok(ctx.get_output())
}

fn compile_imports(imports: &BTreeSet<String>, ctx: &CompilerContext) {
    ctx.add_line("import React from \"react\";");
    if ctx.options.motion {
        ctx.add_line("import { motion } from \"framer-motion\";");
    }
    for name in imports {
        ctx.add_line(&format!("import {{ {} }} from \"./{}\";", name, name));
    }
    ctx.add("\n");
}

fn compile_layout(layout: &Layout, tree: &[ResolvedNode<'_>], ctx: &CompilerContext) -> Result<(), CompileError> {
    let wrapper = if ctx.options.motion { "motion.div" } else { "div" };

    // Embedded stylesheets carry the layout rules
    let styles = if ctx.options.embed_styles {
        Vec::new()
    } else {
        layout_inline_styles(layout)
    };

    ctx.add_line(&format!("<{}", wrapper));
    ctx.indent();
    ctx.add_line(&format!(
        "className=\"builder-layout {} layout-{}\"",
        layout.kind.as_str(),
        layout.id
    ));
    if ctx.options.motion {
        ctx.add_line(&format!("layoutId={}", jsx_string(&layout.id)));
    }
    if !styles.is_empty() {
        ctx.add_line(&format!("style={}", style_object(&styles)));
    }
    if let (true, Some(animation)) = (ctx.options.motion, &layout.animation) {
        compile_animation(animation, ctx);
    }
    ctx.dedent();
    ctx.add_line(">");
    ctx.indent();

    for node in tree {
        compile_node(node, ctx)?;
    }

    ctx.dedent();
    ctx.add_line(&format!("</{}>", wrapper));
    Ok(())
}

fn compile_node(node: &ResolvedNode<'_>, ctx: &CompilerContext) -> Result<(), CompileError> {
    let instance = node.instance;
    let wrapper = if ctx.options.motion { "motion.div" } else { "div" };

    let mut classes = vec![
        "builder-component".to_string(),
        instance.component_id.clone(),
        format!("component-{}", instance.id),
    ];
    classes.extend(instance.visibility.hidden_classes());

    let p = &instance.position;
    let mut styles: Vec<(String, Value)> = vec![
        ("position".to_string(), Value::from("absolute")),
        ("left".to_string(), number(p.x)),
        ("top".to_string(), number(p.y)),
        ("width".to_string(), number(p.width)),
        ("height".to_string(), number(p.height)),
        ("zIndex".to_string(), Value::from(p.z_index)),
    ];
    if let Some(rotation) = p.rotation.filter(|r| *r != 0.0) {
        styles.push(("transform".to_string(), Value::String(format!("rotate({}deg)", rotation))));
    }
    styles.extend(inline_styles(&instance.styles, ctx));

    ctx.add_line(&format!("<{}", wrapper));
    ctx.indent();
    ctx.add_line(&format!("className=\"{}\"", classes.join(" ")));
    ctx.add_line(&format!("data-component-id={}", jsx_string(&instance.id)));
    ctx.add_line(&format!("style={}", style_object(&styles)));
    if ctx.options.motion {
        let (hover, tap) = if instance.locked { (1.0, 1.0) } else { (1.02, 0.98) };
        ctx.add_line(&format!("drag={{{}}}", !instance.locked));
        ctx.add_line("dragMomentum={false}");
        ctx.add_line(&format!("whileHover={{{{ scale: {} }}}}", hover));
        ctx.add_line(&format!("whileTap={{{{ scale: {} }}}}", tap));
        if let Some(animation) = &instance.animation {
            compile_animation(animation, ctx);
        }
    }
    ctx.dedent();
    ctx.add_line(">");
    ctx.indent();

    let mut element = format!("<{}", element_name(node));
    let mut spread = serde_json::Map::new();
    for (key, value) in &instance.props {
        if is_attribute_name(key) {
            element.push_str(&format!(" {}={{{}}}", key, serde_json::to_string(value)?));
        } else {
            spread.insert(key.clone(), value.clone());
        }
    }
    if !spread.is_empty() {
        element.push_str(&format!(" {{...{}}}", serde_json::to_string(&spread)?));
    }
    if !instance.interactions.is_empty() {
        element.push_str(&format!(
            " interactions={{{}}}",
            serde_json::to_string(&instance.interactions)?
        ));
    }
    element.push_str(" />");
    ctx.add_line(&element);

    for child in &node.children {
        compile_node(child, ctx)?;
    }

    ctx.dedent();
    ctx.add_line(&format!("</{}>", wrapper));
    Ok(())
}

/// Desktop default styles as inline entries; empty when the stylesheet is
/// embedded, so breakpoint and state rules are not shadowed
fn inline_styles(records: &[StyleRecord], ctx: &CompilerContext) -> Vec<(String, Value)> {
    if ctx.options.embed_styles {
        return Vec::new();
    }
    effective_styles(records, Breakpoint::Desktop, StyleState::Default)
        .into_iter()
        .map(|d| (d.property, Value::String(d.value)))
        .collect()
}

fn layout_inline_styles(layout: &Layout) -> Vec<(String, Value)> {
    let mut styles: Vec<(String, Value)> = Vec::new();
    match layout.kind {
        LayoutKind::Grid => styles.push(("display".to_string(), Value::from("grid"))),
        LayoutKind::Flex => styles.push(("display".to_string(), Value::from("flex"))),
        LayoutKind::Canvas => styles.push(("position".to_string(), Value::from("relative"))),
        _ => {}
    }
    for (key, value) in &layout.props {
        if value.is_string() || value.is_number() {
            let key = match (layout.kind, key.as_str()) {
                (LayoutKind::Grid, "columns") => "gridTemplateColumns".to_string(),
                _ => key.clone(),
            };
            styles.push((key, value.clone()));
        }
    }
    for d in effective_styles(&layout.styles, Breakpoint::Desktop, StyleState::Default) {
        styles.push((d.property, Value::String(d.value)));
    }
    styles
}

/// Escape text for a JS template literal
fn template_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${")
}

/// `initial` / `animate` (or `whileInView` for scroll triggers) / `transition`
fn compile_animation(animation: &Animation, ctx: &CompilerContext) {
    let (initial, target) = match animation.kind {
        AnimationKind::Fade | AnimationKind::Custom => ("opacity: 0", "opacity: 1"),
        AnimationKind::Slide => ("opacity: 0, y: 40", "opacity: 1, y: 0"),
        AnimationKind::Scale => ("opacity: 0, scale: 0.8", "opacity: 1, scale: 1"),
        AnimationKind::Rotate => ("opacity: 0, rotate: -15", "opacity: 1, rotate: 0"),
        AnimationKind::Bounce => ("y: -20", "y: 0"),
    };
    let key = match animation.trigger {
        AnimationTrigger::Scroll | AnimationTrigger::Viewport => "whileInView",
        _ => "animate",
    };

    let mut transition = format!(
        "duration: {}, delay: {}, ease: {}",
        animation.duration as f64 / 1000.0,
        animation.delay as f64 / 1000.0,
        jsx_string(&animation.easing)
    );
    if animation.repeat {
        transition.push_str(", repeat: Infinity");
    }

    ctx.add_line(&format!("initial={{{{ {} }}}}", initial));
    ctx.add_line(&format!("{}={{{{ {} }}}}", key, target));
    ctx.add_line(&format!("transition={{{{ {} }}}}", transition));
}

/// JSX element name for a kind: `Hero Section` → `HeroSection`
fn element_name(node: &ResolvedNode<'_>) -> String {
    to_pascal_case(&node.definition.name)
}

/// `{{ key: value, ... }}`, keys quoted when not plain identifiers
fn style_object(entries: &[(String, Value)]) -> String {
    let body: Vec<String> = entries
        .iter()
        .map(|(key, value)| {
            let key = if is_identifier(key) { key.clone() } else { jsx_string(key) };
            format!("{}: {}", key, value)
        })
        .collect();
    format!("{{{{ {} }}}}", body.join(", "))
}

/// Whole numbers print without a trailing `.0`
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

fn jsx_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

use pagesmith_common::to_pascal_case;
use pagesmith_compiler_css::{compile_to_css, component_class, layout_class, CssOptions};
use pagesmith_model::{effective_styles, Breakpoint, Page, StyleState};
use pagesmith_registry::{Registry, ResolvedNode};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Failed to serialize embedded data: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Emit the `<style scoped>` block
    pub include_styles: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            include_styles: true,
            indent: "  ".to_string(),
        }
    }
}

struct Context {
    options: CompileOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: CompileOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
        self.add(text);
        self.add("\n");
    }

    /// `prefix` + a multi-line block + `suffix`, continuation lines at the current depth
    fn add_block(&mut self, prefix: &str, block: &str, suffix: &str) {
        let lines: Vec<&str> = block.lines().collect();
        match lines.as_slice() {
            [] => self.add_line(&format!("{}{}", prefix, suffix)),
            [only] => self.add_line(&format!("{}{}{}", prefix, only, suffix)),
            [first, middle @ .., last] => {
                self.add_line(&format!("{}{}", prefix, first));
                for line in middle {
                    self.add_line(line);
                }
                self.add_line(&format!("{}{}", last, suffix));
            }
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Compile a page to a single-file component
///
/// The component is named after the page slug and exposes the page metadata
/// as a `metadata` option.
#[instrument(skip_all, fields(page_id = %page.id))]
pub fn compile_to_vue(page: &Page, registry: &Registry, options: CompileOptions) -> Result<String, CompileError> {
    let mut ctx = Context::new(options);
    let tree = registry.resolve_tree(page);
    let nodes: Vec<&ResolvedNode<'_>> = tree.iter().flat_map(|root| root.walk()).collect();

    let imports: BTreeSet<String> = nodes.iter().map(|node| element_name(node)).collect();
    let mut component_name = to_pascal_case(&page.slug);
    if imports.contains(&component_name) {
        component_name.push_str("Page");
    }

    compile_template(page, &tree, &mut ctx);
    ctx.add("\n");
    compile_script(page, &component_name, &imports, &nodes, &mut ctx)?;

    if ctx.options.include_styles {
        let theme = registry.theme(&page.settings.theme);
        let css_options = CssOptions {
            utilities: true,
            ..CssOptions::scoped()
        };
        let css = compile_to_css(page, theme, &css_options);
        ctx.add("\n");
        ctx.add_line("<style scoped>");
        for line in css.lines().filter(|line| !line.trim().is_empty()) {
            ctx.add_line(line);
        }
        ctx.add_line("</style>");
    }

    debug!(component = %component_name, components = nodes.len(), "Compiled single-file component");
    Ok(ctx.get_output())
}

fn compile_template(page: &Page, tree: &[ResolvedNode<'_>], ctx: &mut Context) {
    ctx.add_line("<template>");
    ctx.indent();
    ctx.add_line("<div class=\"builder-page\" :data-page-id=\"pageId\" :style=\"pageStyles\">");
    ctx.indent();
    ctx.add_line(&format!(
        "<div class=\"builder-layout {} {}\" data-layout-id=\"{}\">",
        page.layout.kind.as_str(),
        layout_class(&page.layout.id),
        escape_attribute(&page.layout.id)
    ));
    ctx.indent();

    for node in tree {
        compile_node(node, ctx);
    }

    ctx.dedent();
    ctx.add_line("</div>");
    ctx.dedent();
    ctx.add_line("</div>");
    ctx.dedent();
    ctx.add_line("</template>");
}

fn compile_node(node: &ResolvedNode<'_>, ctx: &mut Context) {
    let instance = node.instance;

    let mut classes = vec![
        "builder-component".to_string(),
        instance.component_id.clone(),
        component_class(&instance.id),
    ];
    classes.extend(instance.visibility.hidden_classes());

    let key = js_string_single(&instance.id);
    ctx.add_line(&format!(
        "<div class=\"{}\" data-component-id=\"{}\">",
        escape_attribute(&classes.join(" ")),
        escape_attribute(&instance.id)
    ));
    ctx.indent();

    let mut element = format!("<{} v-bind=\"componentProps[{}]\"", element_name(node), key);
    if !instance.interactions.is_empty() {
        element.push_str(&format!(" :interactions=\"componentInteractions[{}]\"", key));
    }
    element.push_str(" />");
    ctx.add_line(&element);

    for child in &node.children {
        compile_node(child, ctx);
    }

    ctx.dedent();
    ctx.add_line("</div>");
}

fn compile_script(
    page: &Page,
    component_name: &str,
    imports: &BTreeSet<String>,
    nodes: &[&ResolvedNode<'_>],
    ctx: &mut Context,
) -> Result<(), CompileError> {
    ctx.add_line("<script>");
    for name in imports {
        ctx.add_line(&format!("import {} from \"./{}.vue\";", name, name));
    }
    if !imports.is_empty() {
        ctx.add("\n");
    }

    let page_styles: Map<String, Value> = effective_styles(&page.styles, Breakpoint::Desktop, StyleState::Default)
        .into_iter()
        .map(|d| (d.property, Value::String(d.value)))
        .collect();
    let component_props: Map<String, Value> = nodes
        .iter()
        .map(|node| (node.instance.id.clone(), Value::Object(node.instance.props.clone())))
        .collect();
    let mut component_interactions = Map::new();
    for node in nodes.iter().filter(|node| !node.instance.interactions.is_empty()) {
        component_interactions.insert(
            node.instance.id.clone(),
            serde_json::to_value(&node.instance.interactions)?,
        );
    }

    ctx.add_line("export default {");
    ctx.indent();
    ctx.add_line(&format!("name: {},", escape_script(&Value::String(component_name.to_string()).to_string())));
    if imports.is_empty() {
        ctx.add_line("components: {},");
    } else {
        let registered: Vec<&str> = imports.iter().map(String::as_str).collect();
        ctx.add_line(&format!("components: {{ {} }},", registered.join(", ")));
    }
    ctx.add_block("metadata: ", &escape_script(&serde_json::to_string_pretty(&page.metadata)?), ",");
    ctx.add_line("data() {");
    ctx.indent();
    ctx.add_line("return {");
    ctx.indent();
    ctx.add_line(&format!("pageId: {},", escape_script(&Value::String(page.id.clone()).to_string())));
    ctx.add_block("pageStyles: ", &escape_script(&serde_json::to_string_pretty(&page_styles)?), ",");
    ctx.add_block("componentProps: ", &escape_script(&serde_json::to_string_pretty(&component_props)?), ",");
    ctx.add_block(
        "componentInteractions: ",
        &escape_script(&serde_json::to_string_pretty(&component_interactions)?),
        "",
    );
    ctx.dedent();
    ctx.add_line("};");
    ctx.dedent();
    ctx.add_line("}");
    ctx.dedent();
    ctx.add_line("};");
    ctx.add_line("</script>");
    Ok(())
}

/// Keep embedded JSON from closing the `<script>` element early
fn escape_script(text: &str) -> String {
    text.replace("</", "<\\/")
}

fn element_name(node: &ResolvedNode<'_>) -> String {
    to_pascal_case(&node.definition.name)
}

/// Single-quoted JS string literal, safe inside a double-quoted attribute
fn js_string_single(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "&quot;");
    format!("'{}'", escaped)
}

fn escape_attribute(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

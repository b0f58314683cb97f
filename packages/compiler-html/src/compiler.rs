use pagesmith_compiler_css::{build_stylesheet, component_class, layout_class, CssOptions};
use pagesmith_model::{Animation, Page};
use pagesmith_registry::{Registry, ResolvedNode};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur during HTML compilation
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Failed to serialize embedded data: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Options for HTML compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Embed the generated stylesheet in a `<style>` block
    pub inline_styles: bool,
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            inline_styles: true,
            pretty: true,
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
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    /// Multi-line text, each line at the current depth
    fn add_block(&mut self, text: &str) {
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            self.add_line(line);
        }
    }

    /// Author-supplied text, written exactly as given on its own lines
    fn add_verbatim(&mut self, text: &str) {
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.add("\n");
        }
        self.add(text);
        if !text.ends_with('\n') {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        let indent = self.options.indent.clone();
        for _ in 0..self.depth {
            self.add(&indent);
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

/// Compile a page to a standalone HTML document
#[instrument(skip_all, fields(page_id = %page.id))]
pub fn compile_to_html(page: &Page, registry: &Registry, options: CompileOptions) -> Result<String, CompileError> {
    let mut ctx = Context::new(options);

    ctx.add_line("<!DOCTYPE html>");
    let mut html_tag = format!("<html lang=\"{}\"", escape_html(&page.settings.language));
    if page.settings.rtl {
        html_tag.push_str(" dir=\"rtl\"");
    }
    html_tag.push('>');
    ctx.add_line(&html_tag);
    ctx.indent();

    compile_head(page, registry, &mut ctx)?;

    ctx.add_line("<body>");
    ctx.indent();

    if page.settings.preloader {
        ctx.add_line("<div class=\"preloader\" aria-hidden=\"true\"></div>");
    }

    ctx.add_line(&format!(
        "<div class=\"builder-page\" data-page-id=\"{}\">",
        escape_html(&page.id)
    ));
    ctx.indent();
    ctx.add_line(&format!(
        "<div class=\"builder-layout {} {}\" data-layout-id=\"{}\">",
        page.layout.kind.as_str(),
        layout_class(&page.layout.id),
        escape_html(&page.layout.id)
    ));
    ctx.indent();

    let tree = registry.resolve_tree(page);
    for node in &tree {
        compile_node(node, &mut ctx)?;
    }

    ctx.dedent();
    ctx.add_line("</div>");
    ctx.dedent();
    ctx.add_line("</div>");

    compile_scripts(page, &mut ctx);

    ctx.dedent();
    ctx.add_line("</body>");

    ctx.dedent();
    ctx.add_line("</html>");

    debug!(components = tree.len(), "Compiled HTML document");
    Ok(ctx.get_output())
}

fn compile_head(page: &Page, registry: &Registry, ctx: &mut Context) -> Result<(), CompileError> {
    let meta = &page.metadata;

    ctx.add_line("<head>");
    ctx.indent();

    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    ctx.add_line(&format!("<title>{}</title>", escape_html(&meta.title)));
    ctx.add_line(&meta_tag("name", "description", &meta.description));
    if !meta.keywords.is_empty() {
        ctx.add_line(&meta_tag("name", "keywords", &meta.keywords.join(", ")));
    }

    let social = [
        ("property", "og:title", &meta.og_title),
        ("property", "og:description", &meta.og_description),
        ("property", "og:image", &meta.og_image),
        ("name", "twitter:card", &meta.twitter_card),
        ("name", "twitter:image", &meta.twitter_image),
    ];
    for (attr, key, value) in social {
        if let Some(value) = value {
            ctx.add_line(&meta_tag(attr, key, value));
        }
    }

    if let Some(canonical) = &meta.canonical {
        ctx.add_line(&format!("<link rel=\"canonical\" href=\"{}\">", escape_html(canonical)));
    }

    let robots: Vec<&str> = [(meta.no_index, "noindex"), (meta.no_follow, "nofollow")]
        .iter()
        .filter(|(flag, _)| *flag)
        .map(|(_, directive)| *directive)
        .collect();
    if !robots.is_empty() {
        ctx.add_line(&meta_tag("name", "robots", &robots.join(", ")));
    }

    if let Some(favicon) = &page.settings.favicon {
        ctx.add_line(&format!("<link rel=\"icon\" href=\"{}\">", escape_html(favicon)));
    }

    if let Some(data) = &meta.structured_data {
        let mut data = data.clone();
        if let Some(object) = data.as_object_mut() {
            object
                .entry("@context")
                .or_insert_with(|| serde_json::Value::String("https://schema.org".to_string()));
        }
        ctx.add_line("<script type=\"application/ld+json\">");
        ctx.indent();
        ctx.add_block(&escape_script(&serde_json::to_string_pretty(&data)?));
        ctx.dedent();
        ctx.add_line("</script>");
    }

    let custom_css = page.settings.custom_css.as_deref().filter(|css| !css.trim().is_empty());
    if ctx.options.inline_styles || custom_css.is_some() {
        ctx.add_line("<style>");
        ctx.indent();
        if ctx.options.inline_styles {
            let theme = registry.theme(&page.settings.theme);
            let sheet = build_stylesheet(page, theme, &CssOptions::default());
            ctx.add_block(&sheet.to_css());
        }
        if let Some(css) = custom_css {
            ctx.add_verbatim(css);
        }
        ctx.dedent();
        ctx.add_line("</style>");
    }

    ctx.dedent();
    ctx.add_line("</head>");
    Ok(())
}

fn compile_node(node: &ResolvedNode<'_>, ctx: &mut Context) -> Result<(), CompileError> {
    let instance = node.instance;

    let mut classes = vec![
        "builder-component".to_string(),
        instance.component_id.clone(),
        component_class(&instance.id),
    ];
    classes.extend(instance.visibility.hidden_classes());

    let mut tag = format!(
        "<div class=\"{}\" data-component-id=\"{}\" data-component=\"{}\"",
        escape_html(&classes.join(" ")),
        escape_html(&instance.id),
        escape_html(&instance.component_id)
    );
    if !instance.props.is_empty() {
        tag.push_str(&attribute("data-props", &serde_json::to_string(&instance.props)?));
    }
    if !instance.interactions.is_empty() {
        tag.push_str(&attribute("data-interactions", &serde_json::to_string(&instance.interactions)?));
    }
    if let Some(animation) = &instance.animation {
        tag.push_str(&animation_attributes(animation));
    }
    if instance.locked {
        tag.push_str(" data-locked=\"true\"");
    }
    tag.push('>');

    ctx.add_line(&tag);
    ctx.indent();
    ctx.add_line(&format!("<!-- {} -->", escape_comment(&node.definition.name)));
    for child in &node.children {
        compile_node(child, ctx)?;
    }
    ctx.dedent();
    ctx.add_line("</div>");

    Ok(())
}

fn compile_scripts(page: &Page, ctx: &mut Context) {
    if let Some(js) = page.settings.custom_js.as_deref().filter(|js| !js.trim().is_empty()) {
        ctx.add_line("<script>");
        ctx.add_verbatim(js);
        ctx.add_line("</script>");
    }

    let tracking_id = page
        .settings
        .analytics
        .as_ref()
        .and_then(|a| a.google_analytics.as_deref())
        .filter(|id| !id.is_empty());
    if let Some(id) = tracking_id {
        let id = escape_html(id);
        ctx.add_line(&format!(
            "<script async src=\"https://www.googletagmanager.com/gtag/js?id={}\"></script>",
            id
        ));
        ctx.add_line("<script>");
        ctx.indent();
        ctx.add_line("window.dataLayer = window.dataLayer || [];");
        ctx.add_line("function gtag(){dataLayer.push(arguments);}");
        ctx.add_line("gtag('js', new Date());");
        ctx.add_line(&format!("gtag('config', '{}');", id));
        ctx.dedent();
        ctx.add_line("</script>");
    }
}

fn animation_attributes(animation: &Animation) -> String {
    let mut attrs = String::new();
    let kind = serde_json::to_value(animation.kind)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default();
    let trigger = serde_json::to_value(animation.trigger)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default();

    attrs.push_str(&attribute("data-animation", &kind));
    attrs.push_str(&attribute("data-animation-trigger", &trigger));
    attrs.push_str(&attribute("data-animation-duration", &animation.duration.to_string()));
    attrs.push_str(&attribute("data-animation-delay", &animation.delay.to_string()));
    attrs.push_str(&attribute("data-animation-easing", &animation.easing));
    attrs
}

fn meta_tag(attr: &str, key: &str, content: &str) -> String {
    format!("<meta {}=\"{}\" content=\"{}\">", attr, key, escape_html(content))
}

fn attribute(name: &str, value: &str) -> String {
    format!(" {}=\"{}\"", name, escape_html(value))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Keep embedded JSON from closing its `<script>` early
fn escape_script(text: &str) -> String {
    text.replace("</", "<\\/")
}

fn escape_comment(text: &str) -> String {
    text.replace("--", "- -")
}

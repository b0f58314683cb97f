//! Built-in seed: the stock component kinds, the default theme and the
//! `landing`/`blog` page templates.

use crate::definition::{ComponentDefinition, PropSchema, PropType};
use crate::theme::{Theme, ThemeBreakpoints, ThemeFonts};
use crate::validation::{ValidationRule, ValueType};
use crate::Registry;
use chrono::Utc;
use pagesmith_model::{
    props, AnalyticsSettings, Breakpoint, ComponentInstance, Interaction, InteractionAction, Layout, LayoutKind,
    Page, PageMetadata, PageSettings, Point, ResponsiveOverrides, StyleRecord,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::warn;

pub const DEFAULT_THEME: &str = "modern-dark";

fn interaction(kind: &str, event: &str, action: &str, target: &str) -> Interaction {
    Interaction {
        id: format!("{}-{}", kind, event),
        event: event.to_string(),
        actions: vec![InteractionAction {
            action_type: action.to_string(),
            target: target.to_string(),
            value: Value::Null,
            delay: None,
            duration: None,
            easing: None,
            metadata: None,
        }],
        conditions: Vec::new(),
        throttle: None,
        debounce: None,
        prevent_default: false,
        stop_propagation: false,
    }
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

fn rules(list: &[(&str, ValidationRule)]) -> BTreeMap<String, ValidationRule> {
    list.iter().map(|(k, r)| (k.to_string(), r.clone())).collect()
}

pub fn components() -> Vec<ComponentDefinition> {
    let mut hero = ComponentDefinition::new("hero", "Hero Section", "layout");
    hero.icon = Some("🚀".to_string());
    hero.tags = tags(&["banner", "header"]);
    hero.default_width = 1200.0;
    hero.default_height = 600.0;
    hero.props = vec![
        PropSchema::new("title", PropType::String).required(),
        PropSchema::new("subtitle", PropType::String),
        PropSchema::new("backgroundImage", PropType::Image),
        PropSchema::new("ctaText", PropType::String),
        PropSchema::new("ctaLink", PropType::Link),
    ];
    hero.validation = rules(&[
        ("title", ValidationRule::typed(ValueType::String)),
        ("subtitle", ValidationRule::typed(ValueType::String)),
        ("ctaLink", ValidationRule::typed(ValueType::String)),
    ]);
    hero.default_styles = vec![
        StyleRecord::new("padding", "4rem"),
        StyleRecord::new("textAlign", "center"),
        StyleRecord::new("backgroundColor", "#000"),
    ];
    hero.interactions = vec![interaction("hero", "click", "navigate", "ctaLink")];

    let mut services = ComponentDefinition::new("services-grid", "Services Grid", "content");
    services.icon = Some("📋".to_string());
    services.tags = tags(&["services", "grid"]);
    services.default_width = 1200.0;
    services.default_height = 400.0;
    services.props = vec![
        PropSchema::new("services", PropType::Array).required().with_default(json!([])),
        PropSchema::new("columns", PropType::Number).with_default(3),
        PropSchema::new("showPrices", PropType::Boolean).with_default(true),
    ];
    services.validation = rules(&[
        ("services", ValidationRule::typed(ValueType::Array).required()),
        ("columns", ValidationRule::typed(ValueType::Number).range(Some(1.0), Some(6.0))),
        ("showPrices", ValidationRule::typed(ValueType::Boolean)),
    ]);
    services.default_styles = vec![
        StyleRecord::new("gap", "2rem"),
        StyleRecord::new("gap", "1rem").at(Breakpoint::Mobile),
        StyleRecord::new("padding", "2rem"),
    ];
    services.interactions = vec![interaction("services-grid", "click", "book-service", "self")];

    let mut testimonials = ComponentDefinition::new("testimonial-carousel", "Testimonials", "social");
    testimonials.icon = Some("💬".to_string());
    testimonials.tags = tags(&["reviews", "carousel"]);
    testimonials.default_width = 1200.0;
    testimonials.default_height = 300.0;
    testimonials.props = vec![
        PropSchema::new("testimonials", PropType::Array).required().with_default(json!([])),
        PropSchema::new("autoPlay", PropType::Boolean).with_default(true),
        PropSchema::new("showRating", PropType::Boolean).with_default(true),
    ];
    testimonials.validation = rules(&[
        ("testimonials", ValidationRule::typed(ValueType::Array).required()),
        ("autoPlay", ValidationRule::typed(ValueType::Boolean)),
    ]);
    testimonials.default_styles = vec![
        StyleRecord::new("backgroundColor", "#f8f9fa"),
        StyleRecord::new("padding", "3rem"),
    ];
    testimonials.interactions = vec![interaction("testimonial-carousel", "hover", "pause-carousel", "self")];

    let mut contact = ComponentDefinition::new("contact-form", "Contact Form", "forms");
    contact.icon = Some("📝".to_string());
    contact.tags = tags(&["contact", "email"]);
    contact.default_width = 500.0;
    contact.default_height = 480.0;
    contact.props = vec![
        PropSchema::new("fields", PropType::Array).required().with_default(json!(["name", "email", "message"])),
        PropSchema::new("submitText", PropType::String).with_default("Send Message"),
        PropSchema::new("successMessage", PropType::String),
    ];
    contact.validation = rules(&[
        ("fields", ValidationRule::typed(ValueType::Array).required()),
        ("submitText", ValidationRule::typed(ValueType::String)),
    ]);
    contact.default_styles = vec![
        StyleRecord::new("maxWidth", "500px"),
        StyleRecord::new("margin", "0 auto"),
    ];
    contact.interactions = vec![interaction("contact-form", "submit", "send-email", "self")];

    let mut pricing = ComponentDefinition::new("pricing-cards", "Pricing Cards", "commerce");
    pricing.icon = Some("💰".to_string());
    pricing.tags = tags(&["pricing", "plans"]);
    pricing.default_width = 1200.0;
    pricing.default_height = 500.0;
    pricing.props = vec![
        PropSchema::new("plans", PropType::Array).required().with_default(json!([])),
        PropSchema::new("featured", PropType::String),
        PropSchema::new("currency", PropType::String).with_default("USD"),
    ];
    pricing.validation = rules(&[
        ("plans", ValidationRule::typed(ValueType::Array).required()),
        ("currency", ValidationRule::typed(ValueType::String)),
    ]);
    pricing.default_styles = vec![
        StyleRecord::new("display", "grid"),
        StyleRecord::new("gap", "2rem"),
    ];
    pricing.interactions = vec![interaction("pricing-cards", "click", "select-plan", "self")];

    let mut section = ComponentDefinition::new("section", "Section", "layout");
    section.icon = Some("▭".to_string());
    section.tags = tags(&["container", "wrapper"]);
    section.description = "Generic container that other components can be nested in".to_string();
    section.default_width = 1200.0;
    section.default_height = 400.0;
    section.nestable = true;
    section.default_styles = vec![StyleRecord::new("padding", "2rem")];

    vec![hero, services, testimonials, contact, pricing, section]
}

pub fn themes() -> Vec<Theme> {
    let colors = [("primary", "#000000"), ("secondary", "#ffffff"), ("accent", "#ff6b35")];
    let spacing = [("small", "1rem"), ("medium", "2rem"), ("large", "4rem")];

    vec![Theme {
        id: DEFAULT_THEME.to_string(),
        name: "Modern Dark".to_string(),
        colors: colors.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        fonts: ThemeFonts {
            heading: "Inter".to_string(),
            body: "Inter".to_string(),
        },
        spacing: spacing.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        breakpoints: ThemeBreakpoints::default(),
        variables: BTreeMap::new(),
    }]
}

/// Template pages; component instances are built through `registry`
pub fn templates(registry: &Registry) -> Vec<Page> {
    vec![landing_template(registry), blog_template()]
}

fn template_instance(registry: &Registry, kind: &str, id: &str, overrides: Value, y: f64) -> Option<ComponentInstance> {
    match registry.instantiate(kind, id, props(overrides), Point::new(0.0, y), 1) {
        Ok(instance) => Some(instance),
        Err(e) => {
            warn!(kind, error = %e, "Skipping template component");
            None
        }
    }
}

fn landing_template(registry: &Registry) -> Page {
    let mut page = Page::blank("landing-template", "Modern Landing Page", "landing", Utc::now());
    page.tags = ["landing", "business", "modern"].iter().map(|t| t.to_string()).collect();

    page.layout = Layout::new("root", LayoutKind::Container);
    page.layout.props = props(json!({ "maxWidth": "1200px", "margin": "0 auto", "padding": "0 20px" }));
    page.layout.children = ["header", "hero", "services", "about", "testimonials", "contact", "footer"]
        .iter()
        .map(|id| id.to_string())
        .collect();
    page.layout.responsive = ResponsiveOverrides {
        desktop: Some(props(json!({ "maxWidth": "1200px" }))),
        tablet: Some(props(json!({ "maxWidth": "768px" }))),
        mobile: Some(props(json!({ "maxWidth": "100%", "padding": "0 16px" }))),
    };

    page.components = [
        template_instance(
            registry,
            "hero",
            "hero",
            json!({
                "title": "Welcome to Modern Men",
                "subtitle": "Premium grooming services for the modern gentleman",
                "backgroundImage": "/images/hero-bg.jpg",
                "ctaText": "Book Now",
                "ctaLink": "/book",
                "overlay": true,
                "overlayOpacity": 0.4
            }),
            0.0,
        ),
        template_instance(
            registry,
            "services-grid",
            "services",
            json!({ "columns": 3, "showPrices": true, "animation": "fadeInUp", "spacing": "large" }),
            600.0,
        ),
        template_instance(
            registry,
            "testimonial-carousel",
            "testimonials",
            json!({ "autoPlay": true, "showRating": true, "interval": 5000, "showDots": true, "showArrows": true }),
            1000.0,
        ),
    ]
    .into_iter()
    .flatten()
    .collect();

    page.styles = vec![
        StyleRecord::new("backgroundColor", "#ffffff").at(Breakpoint::Desktop),
        StyleRecord::new("fontFamily", "Inter, sans-serif"),
    ];
    page.settings = PageSettings {
        preloader: true,
        analytics: Some(AnalyticsSettings::default()),
        ..PageSettings::default()
    };
    page.metadata = PageMetadata {
        title: "Modern Men Hair Salon - Premium Grooming Services".to_string(),
        description: "Experience premium grooming services for the modern gentleman. Professional haircuts, styling, and grooming in a luxurious environment.".to_string(),
        keywords: ["hair salon", "barber", "grooming", "men", "haircut", "styling"]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        og_title: Some("Modern Men Hair Salon".to_string()),
        og_description: Some("Premium grooming services for men".to_string()),
        og_image: Some("/images/og-image.jpg".to_string()),
        twitter_card: Some("summary_large_image".to_string()),
        structured_data: Some(json!({
            "@type": "LocalBusiness",
            "name": "Modern Men Hair Salon",
            "description": "Premium grooming services for men"
        })),
        ..PageMetadata::default()
    };
    page
}

fn blog_template() -> Page {
    let mut page = Page::blank("blog-template", "Blog Layout", "blog", Utc::now());
    page.tags = ["blog", "content", "articles"].iter().map(|t| t.to_string()).collect();

    page.layout = Layout::new("blog-root", LayoutKind::Grid);
    page.layout.props = props(json!({
        "columns": "1fr 300px",
        "gap": "40px",
        "maxWidth": "1200px",
        "margin": "0 auto"
    }));
    page.layout.children = vec!["main-content".to_string(), "sidebar".to_string()];
    page.layout.responsive = ResponsiveOverrides {
        desktop: Some(props(json!({ "gridTemplateColumns": "1fr 300px" }))),
        tablet: Some(props(json!({ "gridTemplateColumns": "1fr" }))),
        mobile: Some(props(json!({ "gridTemplateColumns": "1fr", "gap": "20px" }))),
    };

    page.settings.theme = "blog-clean".to_string();
    page.metadata = PageMetadata {
        title: "Blog".to_string(),
        description: "Latest articles and insights".to_string(),
        keywords: vec!["blog".to_string(), "articles".to_string(), "insights".to_string()],
        ..PageMetadata::default()
    };
    page
}

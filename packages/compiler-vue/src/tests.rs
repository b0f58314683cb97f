use crate::{compile_to_vue, CompileOptions};
use chrono::Utc;
use pagesmith_model::{props, Page, Point, Props};
use pagesmith_registry::Registry;
use serde_json::json;

fn page_with(registry: &Registry, kinds: &[(&str, &str)]) -> Page {
    let mut page = Page::blank("p-1", "Summer Sale", "summer-sale", Utc::now());
    for (z, (kind, id)) in kinds.iter().enumerate() {
        let instance = registry
            .instantiate(kind, *id, Props::new(), Point::new(0.0, 0.0), z as i64 + 1)
            .unwrap();
        page.layout.children.push(instance.id.clone());
        page.components.push(instance);
    }
    page
}

#[test]
fn test_single_file_component_sections() {
    let registry = Registry::builtin();
    let page = page_with(&registry, &[("hero", "h1")]);

    let result = compile_to_vue(&page, &registry, CompileOptions::default()).expect("Failed to compile");

    println!("Generated SFC:\n{}", result);

    assert!(result.starts_with("<template>\n"));
    assert!(result.contains("<div class=\"builder-page\" :data-page-id=\"pageId\" :style=\"pageStyles\">"));
    assert!(result.contains("<div class=\"builder-layout container layout-root\" data-layout-id=\"root\">"));
    assert!(result.contains("<script>"));
    assert!(result.contains("import HeroSection from \"./HeroSection.vue\";"));
    assert!(result.contains("export default {"));
    assert!(result.contains("name: \"SummerSale\","));
    assert!(result.contains("components: { HeroSection },"));
    assert!(result.contains("pageId: \"p-1\","));
    assert!(result.contains("<style scoped>"));
    assert!(result.trim_end().ends_with("</style>"));
}

#[test]
fn test_metadata_option() {
    let registry = Registry::builtin();
    let mut page = page_with(&registry, &[]);
    page.metadata.keywords = vec!["sale".to_string()];

    let result = compile_to_vue(&page, &registry, CompileOptions::default()).unwrap();

    assert!(result.contains("metadata: {"));
    assert!(result.contains("\"title\": \"Summer Sale\","));
    assert!(result.contains("\"sale\""));
    assert!(result.contains("components: {},"));
}

#[test]
fn test_component_binding_and_props_data() {
    let registry = Registry::builtin();
    let mut page = page_with(&registry, &[("hero", "h1"), ("section", "sec")]);
    if let Some(hero) = page.component_mut("h1") {
        hero.props = props(json!({ "title": "Launch" }));
    }

    let result = compile_to_vue(&page, &registry, CompileOptions::default()).unwrap();

    assert!(result.contains("<HeroSection v-bind=\"componentProps['h1']\" :interactions=\"componentInteractions['h1']\" />"));
    assert!(result.contains("<Section v-bind=\"componentProps['sec']\" />"));
    assert!(result.contains("\"title\": \"Launch\""));
    assert!(result.contains("\"id\": \"hero-click\""));
    assert!(result.contains("class=\"builder-component hero component-h1\""));
}

#[test]
fn test_nested_and_hidden_components() {
    let registry = Registry::builtin();
    let mut page = page_with(&registry, &[("section", "sec")]);
    let mut hero = registry
        .instantiate("hero", "h1", Props::new(), Point::default(), 2)
        .unwrap();
    hero.visibility.tablet = false;
    page.components.push(hero);
    if let Some(section) = page.component_mut("sec") {
        section.children = Some(vec!["h1".to_string()]);
    }

    let result = compile_to_vue(&page, &registry, CompileOptions::default()).unwrap();

    let section_at = result.find("data-component-id=\"sec\"").unwrap();
    let hero_at = result.find("data-component-id=\"h1\"").unwrap();
    assert!(section_at < hero_at);
    assert!(result.contains("component-h1 hidden-tablet"));
    assert!(result.contains(".hidden-tablet {"));
}

#[test]
fn test_scoped_styles_skip_document_rules() {
    let registry = Registry::builtin();
    let page = page_with(&registry, &[("hero", "h1")]);

    let result = compile_to_vue(&page, &registry, CompileOptions::default()).unwrap();

    assert!(result.contains(".component-h1 {"));
    assert!(!result.contains("body {"));
    assert!(!result.contains(":root {"));

    let options = CompileOptions {
        include_styles: false,
        ..CompileOptions::default()
    };
    let result = compile_to_vue(&page, &registry, options).unwrap();
    assert!(!result.contains("<style"));
}

#[test]
fn test_unknown_kinds_are_skipped() {
    let registry = Registry::builtin();
    let mut page = page_with(&registry, &[("hero", "h1"), ("pricing-cards", "p1")]);
    page.layout.children.push("ghost".to_string());
    if let Some(pricing) = page.component_mut("p1") {
        pricing.component_id = "retired-kind".to_string();
    }

    let result = compile_to_vue(&page, &registry, CompileOptions::default()).unwrap();

    assert!(result.contains("componentProps['h1']"));
    assert!(!result.contains("componentProps['p1']"));
    assert!(!result.contains("PricingCards"));
    assert!(!result.contains("ghost"));
}

#[test]
fn test_script_data_cannot_close_the_script() {
    let registry = Registry::builtin();
    let mut page = page_with(&registry, &[("hero", "h1")]);
    page.metadata.title = "Deals </script><script>alert(1)</script>".to_string();
    if let Some(hero) = page.component_mut("h1") {
        hero.props = props(json!({ "title": "</script>" }));
    }

    let result = compile_to_vue(&page, &registry, CompileOptions::default()).unwrap();
    let script = &result[result.find("<script>").unwrap()..];

    assert_eq!(script.matches("</script>").count(), 1);
    assert!(script.contains("\"title\": \"<\\/script>\""));
}

use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_registry::ComponentDefinition;
use std::path::Path;

#[derive(Debug, Args)]
pub struct ComponentsArgs {
    /// Only list kinds in this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Free-text search over name, description and tags
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    /// Only list templates carrying this tag
    #[arg(short, long)]
    pub tag: Option<String>,
}

/// List the component kinds a page can use
pub fn components(args: ComponentsArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.load_registry(cwd)?;

    let kinds = select_components(
        match &args.search {
            Some(query) => registry.search_components(query),
            None => registry.available_components(None),
        },
        args.category.as_deref(),
    );

    if kinds.is_empty() {
        println!("{}", "⚠️  No matching components".yellow());
        return Ok(());
    }

    for category in registry.component_categories() {
        let in_category: Vec<_> = kinds.iter().filter(|d| d.category == category).collect();
        if in_category.is_empty() {
            continue;
        }

        println!("{}", category.bright_blue().bold());
        for definition in in_category {
            let mut line = format!("  {:<24} {}", definition.id.bright_white(), definition.name);
            if !definition.dependencies.is_empty() {
                line.push_str(&format!(" (requires {})", definition.dependencies.join(", ")).dimmed().to_string());
            }
            println!("{}", line);
        }
    }

    Ok(())
}

/// List the page templates `pagesmith new --template` accepts
pub fn templates(args: TemplatesArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.load_registry(cwd)?;

    let templates = registry.available_templates(args.tag.as_deref());
    if templates.is_empty() {
        println!("{}", "⚠️  No matching templates".yellow());
        return Ok(());
    }

    for (key, page) in templates {
        let tags: Vec<&str> = page.tags.iter().map(String::as_str).collect();
        println!(
            "  {:<16} {} {}",
            key.bright_white(),
            page.name,
            format!("[{}]", tags.join(", ")).dimmed()
        );
    }

    Ok(())
}

fn select_components<'a>(
    kinds: Vec<&'a ComponentDefinition>,
    category: Option<&str>,
) -> Vec<&'a ComponentDefinition> {
    kinds
        .into_iter()
        .filter(|d| category.map_or(true, |c| d.category == c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_registry::Registry;

    #[test]
    fn test_select_components_by_category() {
        let registry = Registry::builtin();
        let all = registry.available_components(None);
        let total = all.len();

        let layout = select_components(all, Some("layout"));
        assert!(!layout.is_empty());
        assert!(layout.len() < total);
        assert!(layout.iter().all(|d| d.category == "layout"));
    }

    #[test]
    fn test_listing_commands_succeed() {
        let dir = tempfile::tempdir().unwrap();

        components(
            ComponentsArgs {
                category: None,
                search: Some("pricing".to_string()),
            },
            dir.path(),
        )
        .unwrap();
        templates(TemplatesArgs { tag: None }, dir.path()).unwrap();
    }
}

use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{Engine, PageOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Template to start from (see `pagesmith templates`); blank when omitted
    #[arg(short, long)]
    pub template: Option<String>,

    /// Page name
    #[arg(short, long)]
    pub name: Option<String>,

    /// URL slug (derived from the name when omitted)
    #[arg(short, long)]
    pub slug: Option<String>,

    /// Print the page JSON instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Create a page and write it as `<pagesDir>/<slug>.json`
pub fn new_page(args: NewArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.load_registry(cwd)?;
    let mut engine = Engine::new(registry, config.engine.clone());

    let pages_dir = config.pages_dir(cwd);
    let options = PageOptions {
        name: args.name,
        slug: args.slug,
    };
    let page = engine.create_page(args.template.as_deref(), options)?;
    let json = page.to_json()?;

    if args.stdout {
        println!("{}", json);
        return Ok(());
    }

    let path = free_path(&pages_dir, &page.slug);
    fs::create_dir_all(&pages_dir)?;
    fs::write(&path, json)?;

    println!(
        "{} Created {} ({} components) → {}",
        "✓".green(),
        page.name.bright_white(),
        page.components.len(),
        path.display()
    );
    Ok(())
}

/// `<slug>.json`, or `<slug>-2.json`, ... if that file already exists
fn free_path(dir: &Path, slug: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.json", slug));
    let mut n = 2;
    while path.exists() {
        path = dir.join(format!("{}-{}.json", slug, n));
        n += 1;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_model::Page;

    #[test]
    fn test_new_page_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let args = NewArgs {
            template: Some("landing".to_string()),
            name: Some("Spring Launch".to_string()),
            slug: None,
            stdout: false,
        };

        new_page(args, dir.path()).unwrap();

        let written = dir.path().join("pages").join("spring-launch.json");
        let page = Page::from_json(&fs::read_to_string(written).unwrap()).unwrap();
        assert_eq!(page.name, "Spring Launch");
        assert!(!page.components.is_empty());
    }

    #[test]
    fn test_new_page_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        for _ in 0..2 {
            let args = NewArgs {
                template: None,
                name: None,
                slug: None,
                stdout: false,
            };
            new_page(args, dir.path()).unwrap();
        }

        let pages = dir.path().join("pages");
        assert!(pages.join("new-page.json").exists());
        assert!(pages.join("new-page-2.json").exists());
    }

    #[test]
    fn test_unknown_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = NewArgs {
            template: Some("portfolio".to_string()),
            name: None,
            slug: None,
            stdout: false,
        };

        let err = new_page(args, dir.path()).unwrap_err();
        assert!(err.to_string().contains("portfolio"));
    }
}

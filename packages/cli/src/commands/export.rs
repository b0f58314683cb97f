use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{Engine, ExportFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Page file or directory of pages (defaults to the configured pages dir)
    pub path: Option<String>,

    /// Target format (markup, html, json, alt-framework)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,
}

pub fn export(args: ExportArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let format: ExportFormat = args
        .format
        .as_deref()
        .unwrap_or(config.default_format.as_str())
        .parse()?;

    let input = match &args.path {
        Some(path) => cwd.join(path),
        None => config.pages_dir(cwd),
    };
    if !input.exists() {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    }

    let out_dir = match &args.out_dir {
        Some(out) => cwd.join(out),
        None => config.out_dir(cwd),
    };

    if !args.stdout {
        println!(
            "{}",
            format!("🔨 Exporting pages as {}...", format).bright_blue().bold()
        );
    }

    let files = find_page_files(&input);
    if files.is_empty() {
        println!("{}", "⚠️  No page files found".yellow());
        return Ok(());
    }

    let registry = config.load_registry(cwd)?;
    let mut engine = Engine::new(registry, config.engine.clone());

    let mut success_count = 0;
    let mut error_count = 0;

    for file in &files {
        let relative_path = file.strip_prefix(&input).unwrap_or(file);
        match export_file(&mut engine, file, format, &out_dir, args.stdout) {
            Ok(Some(output_path)) => {
                success_count += 1;
                println!(
                    "  {} {} → {}",
                    "✓".green(),
                    relative_path.display(),
                    output_path.display()
                );
            }
            Ok(None) => success_count += 1,
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    e.to_string().red()
                );
            }
        }
    }

    if args.stdout {
        return if error_count == 0 {
            Ok(())
        } else {
            Err(anyhow!("{} pages failed to export", error_count))
        };
    }

    println!();
    if error_count == 0 {
        println!("{} Exported {} pages successfully", "✅".green(), success_count);
    } else {
        println!(
            "{} Exported {} pages, {} errors",
            "⚠️".yellow(),
            success_count,
            error_count
        );
    }

    Ok(())
}

/// Every `*.json` under `input`, or `input` itself when it is a file
fn find_page_files(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    files
}

fn export_file(
    engine: &mut Engine,
    file: &Path,
    format: ExportFormat,
    out_dir: &Path,
    stdout: bool,
) -> Result<Option<PathBuf>> {
    let source = fs::read_to_string(file)?;
    let page = engine.import_page(&source)?;
    let (page_id, slug) = (page.id.clone(), page.slug.clone());
    debug!(file = %file.display(), page_id = %page_id, %format, "Imported page");

    let output = engine.export_page_as(&page_id, format)?;

    if stdout {
        println!("{}", output);
        return Ok(None);
    }

    let output_file = out_dir.join(format!("{}.{}", slug, format.extension()));
    fs::create_dir_all(out_dir)?;
    fs::write(&output_file, output)?;

    Ok(Some(output_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{new_page, NewArgs};

    fn project_with_page(template: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let args = NewArgs {
            template: template.map(String::from),
            name: Some("Home".to_string()),
            slug: None,
            stdout: false,
        };
        new_page(args, dir.path()).unwrap();
        dir
    }

    #[test]
    fn test_export_directory_to_html() {
        let dir = project_with_page(Some("landing"));
        let args = ExportArgs {
            path: None,
            format: None,
            out_dir: None,
            stdout: false,
        };

        export(args, dir.path()).unwrap();

        let html = fs::read_to_string(dir.path().join("dist").join("home.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_export_single_file_with_format() {
        let dir = project_with_page(None);
        let args = ExportArgs {
            path: Some("pages/home.json".to_string()),
            format: Some("vue".to_string()),
            out_dir: Some("out".to_string()),
            stdout: false,
        };

        export(args, dir.path()).unwrap();

        assert!(dir.path().join("out").join("home.vue").exists());
    }

    #[test]
    fn test_export_unknown_format() {
        let dir = project_with_page(None);
        let args = ExportArgs {
            path: None,
            format: Some("pdf".to_string()),
            out_dir: None,
            stdout: false,
        };

        let err = export(args, dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported export format: pdf");
    }

    #[test]
    fn test_find_page_files_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("nested").join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = find_page_files(dir.path());
        assert_eq!(files.len(), 2);
    }
}

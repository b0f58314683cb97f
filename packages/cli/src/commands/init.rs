use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::ExportFormat;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Default export format (markup, html, json, alt-framework)
    #[arg(short, long, default_value = "html")]
    pub format: String,

    /// Directory for page documents
    #[arg(short, long, default_value = "pages")]
    pub pages_dir: String,

    /// Force overwrite existing config
    #[arg(long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    // Reject unknown formats before writing anything
    let format: ExportFormat = args.format.parse()?;

    println!("{}", "📝 Initializing Pagesmith project...".bright_blue().bold());

    let pages_dir = cwd.join(&args.pages_dir);
    if !pages_dir.exists() {
        fs::create_dir_all(&pages_dir)?;
        println!("  {} Created {}/", "✓".green(), args.pages_dir);
    }

    let config = Config {
        pages_dir: args.pages_dir.clone(),
        default_format: format.as_str().to_string(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagesmith new --template landing");
    println!("  2. Run: pagesmith export {}", args.pages_dir);
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}

mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    components, export, init, new_page, templates, ComponentsArgs, ExportArgs, InitArgs, NewArgs,
    TemplatesArgs,
};
use tracing_subscriber::EnvFilter;

/// Pagesmith CLI - build pages from registered components and export them
#[derive(Parser, Debug)]
#[command(name = "pagesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pagesmith project
    Init(InitArgs),

    /// Create a page, blank or from a template
    New(NewArgs),

    /// Export page documents to a target format
    Export(ExportArgs),

    /// List registered component kinds
    Components(ComponentsArgs),

    /// List page templates
    Templates(TemplatesArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::New(args) => new_page(args, &cwd),
        Command::Export(args) => export(args, &cwd),
        Command::Components(args) => components(args, &cwd),
        Command::Templates(args) => templates(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

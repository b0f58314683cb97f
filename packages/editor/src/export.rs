//! Export format dispatch

use pagesmith_compiler_html::compile_to_html;
use pagesmith_compiler_react::compile_to_react;
use pagesmith_compiler_vue::compile_to_vue;
use pagesmith_model::Page;
use pagesmith_registry::Registry;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// JSX function component
    Markup,
    /// Standalone HTML document
    Html,
    /// Canonical page serialization
    Json,
    /// Vue single-file component
    AltFramework,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Markup,
        ExportFormat::Html,
        ExportFormat::Json,
        ExportFormat::AltFramework,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Markup => "markup",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
            ExportFormat::AltFramework => "alt-framework",
        }
    }

    /// File extension for written exports
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markup => "jsx",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
            ExportFormat::AltFramework => "vue",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported export format: {format}")]
pub struct FormatError {
    pub format: String,
}

impl FromStr for ExportFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markup" | "react" => Ok(ExportFormat::Markup),
            "html" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            "alt-framework" | "vue" => Ok(ExportFormat::AltFramework),
            _ => Err(FormatError { format: s.to_string() }),
        }
    }
}

impl TryFrom<&str> for ExportFormat {
    type Error = FormatError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("HTML: {0}")]
    Html(#[from] pagesmith_compiler_html::CompileError),

    #[error("markup: {0}")]
    Markup(#[from] pagesmith_compiler_react::CompileError),

    #[error("alt-framework: {0}")]
    AltFramework(#[from] pagesmith_compiler_vue::CompileError),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render `page` in `format`; reads the page, never changes it
#[instrument(skip(page, registry), fields(page_id = %page.id))]
pub fn export_page(page: &Page, registry: &Registry, format: ExportFormat) -> Result<String, ExportError> {
    let output = match format {
        ExportFormat::Markup => compile_to_react(page, registry, Default::default())?,
        ExportFormat::Html => compile_to_html(page, registry, Default::default())?,
        ExportFormat::Json => page.to_json()?,
        ExportFormat::AltFramework => compile_to_vue(page, registry, Default::default())?,
    };

    debug!(bytes = output.len(), "Exported page");
    Ok(output)
}

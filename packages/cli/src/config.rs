use anyhow::Context;
use pagesmith_editor::{EngineConfig, ExportFormat};
use pagesmith_registry::{Registry, RegistrySeed};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_CONFIG_NAME: &str = "pagesmith.config.json";

/// Pagesmith configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// JSON registry seed merged over the built-in kinds, themes and templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    /// Where `new` writes page documents
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Where `export` writes generated files
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Format used when `export` is given none
    #[serde(default = "default_format")]
    pub default_format: String,

    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_format() -> String {
    ExportFormat::Html.as_str().to_string()
}

impl Config {
    /// Load config from a directory; a missing file yields the defaults
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Built-in registry, extended with the configured seed file
    pub fn load_registry(&self, cwd: &Path) -> anyhow::Result<Arc<Registry>> {
        let mut registry = Registry::builtin();

        if let Some(path) = &self.registry {
            let path = cwd.join(path);
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("Cannot read registry seed {}", path.display()))?;
            registry.extend(RegistrySeed::from_json(&source)?);
        }

        Ok(Arc::new(registry))
    }

    pub fn pages_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.pages_dir)
    }

    pub fn out_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.out_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: None,
            pages_dir: default_pages_dir(),
            out_dir: default_out_dir(),
            default_format: default_format(),
            engine: EngineConfig::default(),
        }
    }
}

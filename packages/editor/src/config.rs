//! Engine tuning knobs. Every field has a default, so a partial (or empty)
//! JSON object is a valid configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub history: HistoryConfig,
    pub snapshots: SnapshotConfig,
    pub clipboard: ClipboardConfig,
    pub dependency_policy: DependencyPolicy,
}

impl EngineConfig {
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    /// Maximum recorded actions per page (0 = unlimited)
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { limit: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotConfig {
    pub max_manual: usize,
    pub max_auto: usize,
    pub autosave_interval_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_manual: 20,
            max_auto: 10,
            autosave_interval_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipboardConfig {
    /// Cascade step between pasted items, in pixels
    pub paste_offset: f64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self { paste_offset: 20.0 }
    }
}

/// What `add_component` does when a kind's declared dependencies are absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyPolicy {
    /// Log a warning and continue
    #[default]
    Warn,
    /// Fail with `EditorError::Dependency`
    Reject,
}

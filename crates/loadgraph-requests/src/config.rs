use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning for the timing correction pass.
///
/// ```toml
/// correct_timing = true
/// script_content_types = ["script", "magic-debug-content"]
/// manifest_content_types = ["data/json", "other", "magic-debug-content"]
/// overlap_tolerance_msec = 0.1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_true")]
    pub correct_timing: bool,
    /// Parents whose initiator edges are considered unreliable.
    #[serde(default = "default_script_content_types")]
    pub script_content_types: Vec<String>,
    /// Siblings that may be the true cause of later fetches.
    #[serde(default = "default_manifest_content_types")]
    pub manifest_content_types: Vec<String>,
    /// Slack before a child starting inside its parent is reported.
    #[serde(default = "default_overlap_tolerance_msec")]
    pub overlap_tolerance_msec: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            correct_timing: default_true(),
            script_content_types: default_script_content_types(),
            manifest_content_types: default_manifest_content_types(),
            overlap_tolerance_msec: default_overlap_tolerance_msec(),
        }
    }
}

impl TimingConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not valid TOML for this shape.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content).context("Failed to parse timing config")
    }

    /// Load from a TOML file, falling back to defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    #[must_use]
    pub fn is_script(&self, content_type: &str) -> bool {
        self.script_content_types.iter().any(|t| t == content_type)
    }

    #[must_use]
    pub fn is_manifest_like(&self, content_type: &str) -> bool {
        self.manifest_content_types.iter().any(|t| t == content_type)
    }
}

const fn default_true() -> bool {
    true
}

fn default_script_content_types() -> Vec<String> {
    vec!["script".to_string(), "magic-debug-content".to_string()]
}

fn default_manifest_content_types() -> Vec<String> {
    vec![
        "data/json".to_string(),
        "other".to_string(),
        "magic-debug-content".to_string(),
    ]
}

const fn default_overlap_tolerance_msec() -> f64 {
    0.1
}

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracemerge_geometry::DEFAULT_THRESHOLD;

use crate::error::{MergeError, MergeResult};

/// What categorization does when a shape comparison is unsupported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedPolicy {
    /// Fail the whole section on the first unsupported comparison.
    #[default]
    Abort,
    /// Log the pair and keep categorizing.
    SkipPair,
}

/// Configuration for a merge session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Union-over-intersection ratio below which two polygons are exact
    /// duplicates. Must be finite and at least 1.0.
    pub threshold: f64,
    /// Report exact and potential duplicates. When `false` only the unique
    /// contours are computed and overlapping contours are kept as in the
    /// source.
    pub include_overlaps: bool,
    /// Handling of unsupported shape comparisons during categorization.
    pub on_unsupported: UnsupportedPolicy,
    /// Whether the series state requires resolved z-contours to be done.
    pub zcontours_gate_completion: bool,
    /// Appended to the series name of the written output.
    pub name_suffix: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            include_overlaps: true,
            on_unsupported: UnsupportedPolicy::Abort,
            zcontours_gate_completion: false,
            name_suffix: "merged".to_string(),
        }
    }
}

impl MergeConfig {
    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> MergeResult<Self> {
        let config: MergeConfig =
            toml::from_str(text).map_err(|e| MergeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file.
    pub fn load(path: &Path) -> MergeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|e| match e {
            MergeError::Config(msg) => MergeError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> MergeResult<()> {
        if !self.threshold.is_finite() || self.threshold < 1.0 {
            return Err(MergeError::Config(format!(
                "threshold must be a finite ratio >= 1.0, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================
//
// Settings for one simulation run, loaded from a JSON file. Every field
// carries a serde default so an older or partial config file still loads.
// Env overrides (TRADEVISION_*) and the command-line history path are applied
// in main.rs after loading.
//
// The regime window and label thresholds are deliberately not configurable;
// they are part of the estimator's definition.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_forward_steps() -> u32 {
    30
}

fn default_output_path() -> String {
    "extended.csv".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// History CSV to load. `None` means the path must come from the
    /// command line or the TRADEVISION_HISTORY env var.
    #[serde(default)]
    pub history_path: Option<String>,

    /// Number of synthetic bars to generate after loading.
    #[serde(default = "default_forward_steps")]
    pub forward_steps: u32,

    /// Seed for the simulation RNG. `None` seeds from OS entropy.
    #[serde(default)]
    pub sim_seed: Option<u64>,

    /// Where the extended series CSV is written.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            history_path: None,
            forward_steps: default_forward_steps(),
            sim_seed: None,
            output_path: default_output_path(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            forward_steps = config.forward_steps,
            output_path = %config.output_path,
            "runtime config loaded"
        );

        Ok(config)
    }
}

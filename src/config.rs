//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! n_clusters = 11
//! seed = 42
//! max_iter = 300
//! tol = 1e-4
//! default_learning_rate = 0.1
//! sample_size = 5
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs for model building, feedback and chart export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Clusters per (gender, body shape) population. A population needs
    /// strictly more records than this to get a model.
    pub n_clusters: usize,
    /// Seed for every k-means run.
    pub seed: u64,
    /// Lloyd iteration cap.
    pub max_iter: usize,
    /// Convergence tolerance on total squared centroid shift.
    pub tol: f64,
    /// Rate used by feedback requests that do not carry one.
    pub default_learning_rate: f64,
    /// Sample records per cluster in the detailed chart export.
    pub sample_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_clusters: 11,
            seed: 42,
            max_iter: 300,
            tol: 1e-4,
            default_learning_rate: 0.1,
            sample_size: 5,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(s).map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(Error::Config("n_clusters must be greater than 0".into()));
        }
        if self.max_iter == 0 {
            return Err(Error::Config("max_iter must be greater than 0".into()));
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(Error::Config("tol must be a finite non-negative number".into()));
        }
        if !(self.default_learning_rate.is_finite() && self.default_learning_rate >= 0.0) {
            return Err(Error::Config(
                "default_learning_rate must be a finite non-negative number".into(),
            ));
        }
        Ok(())
    }
}

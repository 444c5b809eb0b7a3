//! Pipeline configuration.
//!
//! Layered with figment, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `solvency.toml` in the working directory
//! 3. An explicit config file
//! 4. Environment variables prefixed with `SOLVENCY_`, nested with `__`

use crate::{PipelineError, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use solvency_data::{CleaningConfig, ValidationConfig};
use solvency_features::FeatureConfig;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "solvency.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "SOLVENCY_";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Data directory and stage file names
    pub paths: PathsConfig,
    /// Cleaning stage
    pub cleaning: CleaningConfig,
    /// Validation stage
    pub validation: ValidationConfig,
    /// Transformation stage
    pub features: FeatureConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// Where every stage reads and writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding every stage file
    pub data_dir: PathBuf,
    /// Ingested copy of the source table
    pub raw_data: String,
    /// Cleaning output
    pub cleaned_data: String,
    /// Validation output
    pub validated_data: String,
    /// Model-ready feature table
    pub transformed_data: String,
    /// Fitted transformation parameters
    pub transform_params: String,
    /// Per-column summary of the fitted transformation
    pub transform_summary: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            raw_data: "raw_data.csv".to_string(),
            cleaned_data: "cleaned_data.csv".to_string(),
            validated_data: "validated_data.csv".to_string(),
            transformed_data: "transformed_data.csv".to_string(),
            transform_params: "transform_params.json".to_string(),
            transform_summary: "transform_summary.csv".to_string(),
        }
    }
}

impl PathsConfig {
    /// Path of the ingested table.
    pub fn raw(&self) -> PathBuf {
        self.data_dir.join(&self.raw_data)
    }

    /// Path of the cleaned table.
    pub fn cleaned(&self) -> PathBuf {
        self.data_dir.join(&self.cleaned_data)
    }

    /// Path of the validated table.
    pub fn validated(&self) -> PathBuf {
        self.data_dir.join(&self.validated_data)
    }

    /// Path of the transformed table.
    pub fn transformed(&self) -> PathBuf {
        self.data_dir.join(&self.transformed_data)
    }

    /// Path of the fitted parameters.
    pub fn params(&self) -> PathBuf {
        self.data_dir.join(&self.transform_params)
    }

    /// Path of the transformation summary.
    pub fn summary(&self) -> PathBuf {
        self.data_dir.join(&self.transform_summary)
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when neither `RUST_LOG` nor `-v` is given
    pub level: String,
    /// Directory for the JSON log file; `None` logs to stderr only
    pub directory: Option<PathBuf>,
    /// Log file name inside `directory`
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: Some(PathBuf::from("logs")),
            file_name: "solvency.log".to_string(),
        }
    }
}

/// Load configuration from every layer.
///
/// `file` is optional, but when given it must exist.
///
/// # Errors
///
/// Returns [`PipelineError::ConfigNotFound`] for a missing explicit file,
/// [`PipelineError::Config`] if a layer cannot be parsed, and
/// [`PipelineError::InvalidConfig`] if the merged feature configuration is
/// inconsistent.
pub fn load_config(file: Option<&Path>) -> Result<PipelineConfig> {
    let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));

    let local = Path::new(DEFAULT_CONFIG_FILE);
    if local.exists() {
        figment = figment.merge(Toml::file(local));
    }

    if let Some(file) = file {
        if !file.exists() {
            return Err(PipelineError::ConfigNotFound(file.to_path_buf()));
        }
        figment = figment.merge(Toml::file(file));
    }

    // SOLVENCY_PATHS__DATA_DIR, SOLVENCY_FEATURES__EPSILON, etc.
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: PipelineConfig = figment.extract().map_err(Box::new)?;
    config
        .features
        .validate()
        .map_err(PipelineError::InvalidConfig)?;
    Ok(config)
}

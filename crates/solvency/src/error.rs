//! Error types for pipeline runs.

use solvency_data::DataError;
use solvency_features::FeatureError;
use solvency_output::ExportError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Copy the source table into the data directory
    Ingest,
    /// Drop unwanted columns, null rows and duplicates
    Clean,
    /// Check schema, dtypes and nulls
    Validate,
    /// Run the feature pipeline
    Transform,
}

impl Stage {
    /// Lowercase stage name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Clean => "clean",
            Self::Validate => "validate",
            Self::Transform => "transform",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading, cleaning or validating data failed
    #[error("{stage} stage failed: {source}")]
    Data {
        /// Failing stage
        stage: Stage,
        /// Underlying error
        #[source]
        source: DataError,
    },

    /// The feature pipeline failed
    #[error("{stage} stage failed: {source}")]
    Feature {
        /// Failing stage
        stage: Stage,
        /// Underlying error
        #[source]
        source: FeatureError,
    },

    /// Writing parameters or reports failed
    #[error("{stage} stage failed: {source}")]
    Export {
        /// Failing stage
        stage: Stage,
        /// Underlying error
        #[source]
        source: ExportError,
    },

    /// A configuration layer could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// An explicitly requested config file does not exist
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// The merged configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[source] FeatureError),
}

impl PipelineError {
    /// Stage that failed, if the error came from running one.
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Data { stage, .. } | Self::Feature { stage, .. } | Self::Export { stage, .. } => {
                Some(*stage)
            }
            Self::Config(_) | Self::ConfigNotFound(_) | Self::InvalidConfig(_) => None,
        }
    }

    /// Column the underlying error names, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Data { source, .. } => source.column(),
            Self::Feature { source, .. } => source.column(),
            _ => None,
        }
    }
}

/// Attach the failing stage to library errors.
pub(crate) trait StageContext<T> {
    fn at(self, stage: Stage) -> Result<T>;
}

impl<T> StageContext<T> for std::result::Result<T, DataError> {
    fn at(self, stage: Stage) -> Result<T> {
        self.map_err(|source| PipelineError::Data { stage, source })
    }
}

impl<T> StageContext<T> for std::result::Result<T, FeatureError> {
    fn at(self, stage: Stage) -> Result<T> {
        self.map_err(|source| PipelineError::Feature { stage, source })
    }
}

impl<T> StageContext<T> for std::result::Result<T, ExportError> {
    fn at(self, stage: Stage) -> Result<T> {
        self.map_err(|source| PipelineError::Export { stage, source })
    }
}

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/solvency/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod stages;

// Re-export main types from sub-crates
pub use solvency_data as data;
pub use solvency_features as features;
pub use solvency_output as output;

pub use config::{LoggingConfig, PathsConfig, PipelineConfig, load_config};
pub use error::{PipelineError, Result, Stage};
pub use stages::{Pipeline, TransformOutcome};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

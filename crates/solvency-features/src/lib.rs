#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/solvency/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod encoding;
pub mod error;
pub mod label;
pub mod params;
pub mod pipeline;
pub mod ratios;
pub mod registry;
pub mod scale;
pub mod transformer;
pub mod winsorize;

pub use config::{
    DEFAULT_EPSILON, Denominator, FeatureConfig, LabelPolicy, RatioSpec, WinsorizeConfig,
};
pub use encoding::{FrequencyEncoder, FrequencyParams, OneHotEncoder, OneHotParams};
pub use error::{FeatureError, Result};
pub use label::LabelMapper;
pub use params::TransformParams;
pub use pipeline::FeaturePipeline;
pub use ratios::RatioEngineer;
pub use scale::{Moments, ScaleParams, Scaler, signed_log1p};
pub use transformer::Transformer;
pub use winsorize::{ClipBounds, WinsorizeParams, Winsorizer};

// Re-export registry types for convenience
pub use registry::{RatioCategory, RatioInfo, available_ratios};

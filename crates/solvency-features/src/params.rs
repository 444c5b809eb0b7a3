//! Fitted parameters of the whole transformation stage.

use crate::encoding::{FrequencyParams, OneHotParams};
use crate::scale::ScaleParams;
use crate::winsorize::WinsorizeParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything learned while fitting, enough to replay the transform on new data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    /// When the parameters were fitted
    pub fitted_at: DateTime<Utc>,
    /// Rows in the fitting table
    pub rows: usize,
    /// One-hot categories per encoded column, in configuration order
    pub one_hot: Vec<OneHotParams>,
    /// Frequency tables per encoded column, in configuration order
    pub frequency: Vec<FrequencyParams>,
    /// Winsorization bounds
    pub winsorize: WinsorizeParams,
    /// Scaling moments
    pub scale: ScaleParams,
}

impl TransformParams {
    /// One-hot parameters for `column`, if it was encoded.
    pub fn one_hot_for(&self, column: &str) -> Option<&OneHotParams> {
        self.one_hot.iter().find(|p| p.column == column)
    }

    /// Frequency parameters for `column`, if it was encoded.
    pub fn frequency_for(&self, column: &str) -> Option<&FrequencyParams> {
        self.frequency.iter().find(|p| p.column == column)
    }

    /// Parse parameters previously serialized as JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

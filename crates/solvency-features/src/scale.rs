//! Scaler
//!
//! Two steps, in order:
//!
//! 1. Sign-preserving log compression of the ratio features,
//!    `sign(v) * ln(1 + |v|)`. Maps 0 to 0, keeps the sign and is monotonic,
//!    unlike a plain logarithm it accepts non-positive input.
//! 2. Standardization of raw and ratio columns to zero mean and unit
//!    population standard deviation.

use crate::transformer::Transformer;
use crate::{FeatureError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// `sign(v) * ln(1 + |v|)` for a single value.
pub fn signed_log1p(value: f64) -> f64 {
    value.signum() * value.abs().ln_1p()
}

/// Column expression equivalent of [`signed_log1p`].
fn signed_log1p_expr(column: &str) -> Expr {
    let values = col(column).cast(DataType::Float64);
    (values.clone().sign() * values.abs().log1p()).alias(column)
}

/// Location and scale of one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    /// Column mean
    pub mean: f64,
    /// Population standard deviation, or 1.0 for a constant column
    pub std: f64,
}

/// Fitted scaler parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleParams {
    /// Columns log-compressed before standardizing
    pub log_columns: Vec<String>,
    /// Moments per standardized column, measured after compression
    pub moments: BTreeMap<String, Moments>,
}

/// Log compression plus standardization
#[derive(Debug, Clone)]
pub struct Scaler {
    log_columns: Vec<String>,
    scaled_columns: Vec<String>,
}

impl Scaler {
    /// Create a scaler compressing `log_columns` and standardizing `scaled_columns`.
    pub const fn new(log_columns: Vec<String>, scaled_columns: Vec<String>) -> Self {
        Self {
            log_columns,
            scaled_columns,
        }
    }

    fn require(df: &DataFrame, columns: &[String]) -> Result<()> {
        for column in columns {
            if df.column(column).is_err() {
                return Err(FeatureError::MissingColumn(column.clone()));
            }
        }
        Ok(())
    }

    /// Apply the log compression step on its own.
    pub fn compress(&self, df: DataFrame) -> Result<DataFrame> {
        if self.log_columns.is_empty() {
            return Ok(df);
        }
        Self::require(&df, &self.log_columns)?;

        let exprs: Vec<Expr> = self
            .log_columns
            .iter()
            .map(|c| signed_log1p_expr(c))
            .collect();
        Ok(df.lazy().with_columns(exprs).collect()?)
    }
}

impl Transformer for Scaler {
    type Params = ScaleParams;

    fn name(&self) -> &'static str {
        "scaler"
    }

    fn fit(&self, df: &DataFrame) -> Result<ScaleParams> {
        Self::require(df, &self.scaled_columns)?;
        let compressed = self.compress(df.clone())?;

        let mut exprs = Vec::with_capacity(self.scaled_columns.len() * 2);
        for column in &self.scaled_columns {
            let values = col(column.as_str()).cast(DataType::Float64);
            exprs.push(values.clone().mean().alias(format!("{column}_mean")));
            exprs.push(values.std(0).alias(format!("{column}_std")));
        }
        let stats = compressed.lazy().select(exprs).collect()?;

        let mut moments = BTreeMap::new();
        for column in &self.scaled_columns {
            let mean = stats.column(&format!("{column}_mean"))?.f64()?.get(0);
            let std = stats.column(&format!("{column}_std"))?.f64()?.get(0);
            let (Some(mean), Some(std)) = (mean, std) else {
                return Err(FeatureError::EmptyColumn(column.clone()));
            };
            // Constant columns are centered only
            let std = if std > 0.0 && std.is_finite() { std } else { 1.0 };
            moments.insert(column.clone(), Moments { mean, std });
        }

        Ok(ScaleParams {
            log_columns: self.log_columns.clone(),
            moments,
        })
    }

    fn apply(&self, df: DataFrame, params: &ScaleParams) -> Result<DataFrame> {
        info!(
            log_columns = self.log_columns.len(),
            scaled_columns = self.scaled_columns.len(),
            "Applying standard scaling to numerical columns"
        );
        Self::require(&df, &self.scaled_columns)?;
        let compressed = self.compress(df)?;

        let mut exprs = Vec::with_capacity(self.scaled_columns.len());
        for column in &self.scaled_columns {
            let moments = params
                .moments
                .get(column)
                .ok_or_else(|| FeatureError::MissingParams(column.clone()))?;
            exprs.push(
                ((col(column.as_str()).cast(DataType::Float64) - lit(moments.mean))
                    / lit(moments.std))
                .alias(column.as_str()),
            );
        }

        let out = compressed.lazy().with_columns(exprs).collect()?;
        debug!(columns = self.scaled_columns.len(), "Standard scaling applied successfully");
        Ok(out)
    }
}

//! Outlier Clipper
//!
//! Winsorizes each raw indicator to its own percentile range. Bounds are
//! computed per column with linear interpolation between order statistics,
//! so columns are independent of one another and of processing order.

use crate::config::WinsorizeConfig;
use crate::transformer::Transformer;
use crate::{FeatureError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Clip range for one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipBounds {
    /// Lower percentile value
    pub lower: f64,
    /// Upper percentile value
    pub upper: f64,
}

/// Fitted clip ranges keyed by column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinsorizeParams {
    /// Bounds per column
    pub bounds: BTreeMap<String, ClipBounds>,
}

/// Percentile clipper over a fixed set of columns
#[derive(Debug, Clone)]
pub struct Winsorizer {
    columns: Vec<String>,
    config: WinsorizeConfig,
}

impl Winsorizer {
    /// Create a clipper for `columns`.
    pub const fn new(columns: Vec<String>, config: WinsorizeConfig) -> Self {
        Self { columns, config }
    }
}

impl Transformer for Winsorizer {
    type Params = WinsorizeParams;

    fn name(&self) -> &'static str {
        "winsorizer"
    }

    fn fit(&self, df: &DataFrame) -> Result<WinsorizeParams> {
        let mut exprs = Vec::with_capacity(self.columns.len() * 2);
        for column in &self.columns {
            if df.column(column).is_err() {
                return Err(FeatureError::MissingColumn(column.clone()));
            }
            let values = col(column.as_str()).cast(DataType::Float64);
            exprs.push(
                values
                    .clone()
                    .quantile(lit(self.config.lower_pct), QuantileMethod::Linear)
                    .alias(format!("{column}_lower")),
            );
            exprs.push(
                values
                    .quantile(lit(self.config.upper_pct), QuantileMethod::Linear)
                    .alias(format!("{column}_upper")),
            );
        }

        let stats = df.clone().lazy().select(exprs).collect()?;

        let mut params = WinsorizeParams::default();
        for column in &self.columns {
            let lower = stats.column(&format!("{column}_lower"))?.f64()?.get(0);
            let upper = stats.column(&format!("{column}_upper"))?.f64()?.get(0);
            match (lower, upper) {
                (Some(lower), Some(upper)) => {
                    params
                        .bounds
                        .insert(column.clone(), ClipBounds { lower, upper });
                }
                _ => return Err(FeatureError::EmptyColumn(column.clone())),
            }
        }
        Ok(params)
    }

    fn apply(&self, df: DataFrame, params: &WinsorizeParams) -> Result<DataFrame> {
        info!(
            columns = self.columns.len(),
            "Removing outliers from columns using winsorization"
        );

        let mut exprs = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            if df.column(column).is_err() {
                return Err(FeatureError::MissingColumn(column.clone()));
            }
            let bounds = params
                .bounds
                .get(column)
                .ok_or_else(|| FeatureError::MissingParams(column.clone()))?;
            let values = col(column.as_str()).cast(DataType::Float64);
            exprs.push(
                when(values.clone().lt(lit(bounds.lower)))
                    .then(lit(bounds.lower))
                    .when(values.clone().gt(lit(bounds.upper)))
                    .then(lit(bounds.upper))
                    .otherwise(values)
                    .alias(column.as_str()),
            );
        }

        let out = df.lazy().with_columns(exprs).collect()?;
        debug!(columns = self.columns.len(), "Outliers clipped successfully");
        Ok(out)
    }
}

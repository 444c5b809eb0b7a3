//! Feature Pipeline
//!
//! Runs the five components in a fixed order:
//! label mapping, categorical encoding, ratio engineering, winsorization and
//! scaling. [`FeaturePipeline::fit_transform`] fits every component on its own
//! input and returns the fitted [`TransformParams`];
//! [`FeaturePipeline::transform`] replays those parameters on another table.
//! Row count is never changed.

use crate::config::FeatureConfig;
use crate::encoding::{FrequencyEncoder, OneHotEncoder};
use crate::label::LabelMapper;
use crate::params::TransformParams;
use crate::ratios::RatioEngineer;
use crate::scale::Scaler;
use crate::transformer::Transformer;
use crate::winsorize::Winsorizer;
use crate::{FeatureError, Result};
use chrono::Utc;
use polars::prelude::*;
use solvency_data::coerce_numeric;
use tracing::{debug, info};

/// The complete transformation stage
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    config: FeatureConfig,
    label: LabelMapper,
    one_hot: Vec<OneHotEncoder>,
    frequency: Vec<FrequencyEncoder>,
    ratios: RatioEngineer,
    winsorizer: Winsorizer,
    scaler: Scaler,
}

fn applied<T: Transformer>(component: &T, df: DataFrame, params: &T::Params) -> Result<DataFrame> {
    component
        .apply(df, params)
        .map_err(|e| e.in_component(component.name()))
}

impl FeaturePipeline {
    /// Build the pipeline, rejecting inconsistent configuration.
    pub fn new(config: FeatureConfig) -> Result<Self> {
        config.validate()?;

        let log_columns = if config.log_compress {
            config.ratio_names()
        } else {
            Vec::new()
        };

        Ok(Self {
            label: LabelMapper::new(
                config.target_column.clone(),
                config.label_map.clone(),
                config.label_policy,
            ),
            one_hot: config
                .one_hot_columns
                .iter()
                .cloned()
                .map(OneHotEncoder::new)
                .collect(),
            frequency: config
                .frequency_columns
                .iter()
                .cloned()
                .map(FrequencyEncoder::new)
                .collect(),
            ratios: RatioEngineer::new(config.ratios.clone(), config.epsilon),
            winsorizer: Winsorizer::new(config.raw_columns.clone(), config.winsorize),
            scaler: Scaler::new(log_columns, config.scaled_columns()),
            config,
        })
    }

    /// Configuration the pipeline was built from.
    pub const fn config(&self) -> &FeatureConfig {
        &self.config
    }

    fn prepare(&self, df: DataFrame) -> Result<DataFrame> {
        coerce_numeric(df, &self.config.raw_columns)
            .map_err(|e| FeatureError::from(e).in_component("numeric_coercion"))
    }

    /// Fit every component on the table it receives and transform it.
    pub fn fit_transform(&self, df: DataFrame) -> Result<(DataFrame, TransformParams)> {
        let rows = df.height();
        info!(rows, columns = df.width(), "Starting data transformation");

        let df = self.prepare(df)?;
        let (mut df, ()) = self.label.fit_apply(df)?;

        let mut one_hot = Vec::with_capacity(self.one_hot.len());
        for encoder in &self.one_hot {
            let (next, params) = encoder.fit_apply(df)?;
            df = next;
            one_hot.push(params);
        }

        let mut frequency = Vec::with_capacity(self.frequency.len());
        for encoder in &self.frequency {
            let (next, params) = encoder.fit_apply(df)?;
            df = next;
            frequency.push(params);
        }

        let (df, ()) = self.ratios.fit_apply(df)?;
        let (df, winsorize) = self.winsorizer.fit_apply(df)?;
        let (df, scale) = self.scaler.fit_apply(df)?;

        debug!(rows = df.height(), columns = df.width(), "Data transformation fitted");
        let params = TransformParams {
            fitted_at: Utc::now(),
            rows,
            one_hot,
            frequency,
            winsorize,
            scale,
        };
        Ok((df, params))
    }

    /// Transform a table with parameters from an earlier fit.
    ///
    /// Tables without the target column (e.g. unlabeled scoring data) skip
    /// label mapping.
    pub fn transform(&self, df: DataFrame, params: &TransformParams) -> Result<DataFrame> {
        info!(rows = df.height(), columns = df.width(), "Applying fitted transformation");

        let mut df = self.prepare(df)?;
        if df.column(self.label.column()).is_ok() {
            df = applied(&self.label, df, &())?;
        } else {
            debug!(column = self.label.column(), "No target column, skipping label mapping");
        }

        for encoder in &self.one_hot {
            let fitted = params.one_hot_for(encoder.column()).ok_or_else(|| {
                FeatureError::MissingParams(encoder.column().to_string())
                    .in_component(encoder.name())
            })?;
            df = applied(encoder, df, fitted)?;
        }

        for encoder in &self.frequency {
            let fitted = params.frequency_for(encoder.column()).ok_or_else(|| {
                FeatureError::MissingParams(encoder.column().to_string())
                    .in_component(encoder.name())
            })?;
            df = applied(encoder, df, fitted)?;
        }

        let df = applied(&self.ratios, df, &())?;
        let df = applied(&self.winsorizer, df, &params.winsorize)?;
        applied(&self.scaler, df, &params.scale)
    }
}

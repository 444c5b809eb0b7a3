//! The fit/apply contract shared by every pipeline component.

use crate::Result;
use polars::prelude::*;
use serde::{Serialize, de::DeserializeOwned};

/// A table-to-table transformation with an explicit fitting step.
///
/// `fit` derives whatever statistics the component needs from a table;
/// `apply` replays them on any table with the same schema. Components with
/// nothing to learn use `()` as their parameters.
pub trait Transformer {
    /// Fitted parameters
    type Params: Clone + std::fmt::Debug + Serialize + DeserializeOwned;

    /// Component name used in logs and error context
    fn name(&self) -> &'static str;

    /// Learn parameters from `df`.
    fn fit(&self, df: &DataFrame) -> Result<Self::Params>;

    /// Transform `df` with previously fitted parameters.
    fn apply(&self, df: DataFrame, params: &Self::Params) -> Result<DataFrame>;

    /// Fit on `df` and apply to the same table.
    fn fit_apply(&self, df: DataFrame) -> Result<(DataFrame, Self::Params)> {
        let params = self.fit(&df).map_err(|e| e.in_component(self.name()))?;
        let out = self
            .apply(df, &params)
            .map_err(|e| e.in_component(self.name()))?;
        Ok((out, params))
    }
}

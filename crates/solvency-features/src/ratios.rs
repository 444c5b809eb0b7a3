//! Feature Engineer
//!
//! Appends financial ratio features computed as
//! `numerator / (denominator + epsilon)`. The epsilon keeps exactly-zero
//! denominators from producing infinities; it does not bound the ratio when
//! the denominator is merely close to zero.

use crate::config::{Denominator, RatioSpec};
use crate::transformer::Transformer;
use crate::{FeatureError, Result};
use polars::prelude::*;
use tracing::{debug, info};

/// Computes the configured ratio features
#[derive(Debug, Clone)]
pub struct RatioEngineer {
    ratios: Vec<RatioSpec>,
    epsilon: f64,
}

impl RatioEngineer {
    /// Create an engineer for `ratios` with denominator guard `epsilon`.
    pub const fn new(ratios: Vec<RatioSpec>, epsilon: f64) -> Self {
        Self { ratios, epsilon }
    }

    /// The guard added to every denominator.
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn expr(&self, ratio: &RatioSpec) -> Expr {
        let denominator = match &ratio.denominator {
            Denominator::Column(column) => col(column.as_str()),
            Denominator::Difference {
                minuend,
                subtrahend,
            } => col(minuend.as_str()) - col(subtrahend.as_str()),
        };
        (col(ratio.numerator.as_str()).cast(DataType::Float64)
            / (denominator.cast(DataType::Float64) + lit(self.epsilon)))
        .alias(ratio.name.as_str())
    }
}

impl Transformer for RatioEngineer {
    type Params = ();

    fn name(&self) -> &'static str {
        "ratio_engineer"
    }

    fn fit(&self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn apply(&self, df: DataFrame, _params: &()) -> Result<DataFrame> {
        info!(ratios = self.ratios.len(), "Starting feature engineering process");

        for ratio in &self.ratios {
            for column in ratio.required_columns() {
                if df.column(column).is_err() {
                    return Err(FeatureError::MissingColumn(column.to_string()));
                }
            }
        }

        let exprs: Vec<Expr> = self.ratios.iter().map(|r| self.expr(r)).collect();
        let out = df.lazy().with_columns(exprs).collect()?;

        debug!(columns = out.width(), "Feature engineering completed successfully");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureConfig;
    use approx::assert_relative_eq;

    fn raw_table() -> DataFrame {
        // X1..X18 = row-specific constants; row 0 has X10 = 0 and X18 = 5.
        let mut columns = Vec::new();
        for i in 1..=18 {
            let name = format!("X{i}");
            let values: Vec<f64> = match i {
                10 => vec![0.0, 100.0, 50.0],
                18 => vec![5.0, 40.0, 50.0],
                _ => vec![i as f64, 2.0 * i as f64, -(i as f64)],
            };
            columns.push(Column::new(name.into(), values));
        }
        DataFrame::new(columns).unwrap()
    }

    fn engineer() -> RatioEngineer {
        let config = FeatureConfig::default();
        RatioEngineer::new(config.ratios, config.epsilon)
    }

    fn values(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_nine_ratios_appended() {
        let out = engineer().apply(raw_table(), &()).unwrap();

        assert_eq!(out.width(), 18 + 9);
        assert_eq!(out.height(), 3);
        assert_eq!(out.get_column_names()[18].as_str(), "Leverage_Ratio");
        assert_eq!(out.get_column_names()[26].as_str(), "Inventory_Turnover");
    }

    #[test]
    fn test_zero_denominator_guarded() {
        let out = engineer().apply(raw_table(), &()).unwrap();

        let leverage = values(&out, "Leverage_Ratio");
        assert_relative_eq!(leverage[0], 5.0 / 1e-6, max_relative = 1e-12);
        assert_relative_eq!(leverage[1], 40.0 / (100.0 + 1e-6), max_relative = 1e-12);
    }

    #[test]
    fn test_debt_to_equity_difference_denominator() {
        let out = engineer().apply(raw_table(), &()).unwrap();

        let dte = values(&out, "Debt_to_Equity");
        assert_relative_eq!(dte[1], 40.0 / (60.0 + 1e-6), max_relative = 1e-12);
        // X10 == X18 on the last row leaves only epsilon in the denominator
        assert_relative_eq!(dte[2], 50.0 / 1e-6, max_relative = 1e-12);
    }

    #[test]
    fn test_ratios_finite_for_finite_inputs() {
        let out = engineer().apply(raw_table(), &()).unwrap();

        for name in FeatureConfig::default().ratio_names() {
            for v in values(&out, &name) {
                assert!(v.is_finite(), "{name} produced {v}");
            }
        }
    }

    #[test]
    fn test_integer_inputs_use_float_division() {
        let df = df![
            "X18" => [1i64],
            "X10" => [2i64],
        ]
        .unwrap();
        let engineer = RatioEngineer::new(
            vec![RatioSpec {
                name: "Leverage_Ratio".to_string(),
                numerator: "X18".to_string(),
                denominator: Denominator::Column("X10".to_string()),
            }],
            0.0,
        );

        let out = engineer.apply(df, &()).unwrap();
        assert_eq!(values(&out, "Leverage_Ratio"), vec![0.5]);
    }

    #[test]
    fn test_missing_input_column() {
        let df = df!["X18" => [1.0]].unwrap();
        let err = engineer().apply(df, &()).unwrap_err();
        assert!(matches!(err, FeatureError::MissingColumn(_)));
    }
}

//! Categorical Encoder
//!
//! Two independent strategies for nominal columns:
//!
//! - [`OneHotEncoder`]: drop-first indicator columns for low-cardinality
//!   columns. Categories are sorted so the reference category and the output
//!   column order are deterministic.
//! - [`FrequencyEncoder`]: replaces each value with its share of the column,
//!   for high-cardinality columns.
//!
//! Nominal columns may be read as integers (e.g. SIC major groups). Both
//! encoders match values by their string form, but integer categories are
//! ordered by value, so `9` sorts before `10`.

use crate::transformer::Transformer;
use crate::{FeatureError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Distinct non-null values of `column` as strings.
///
/// Numeric columns are ordered by value, everything else lexicographically.
fn categories(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let values = string_values(df, column)?;
    let labels = values.str()?;

    let source = df.column(column)?;
    if !source.dtype().is_primitive_numeric() {
        let sorted: BTreeSet<String> = labels.into_iter().flatten().map(str::to_string).collect();
        return Ok(sorted.into_iter().collect());
    }

    let numbers = source.cast(&DataType::Float64)?;
    let mut pairs: Vec<(f64, String)> = numbers
        .f64()?
        .into_iter()
        .zip(labels)
        .filter_map(|(number, label)| Some((number?, label?.to_string())))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs.dedup_by(|a, b| a.1 == b.1);
    Ok(pairs.into_iter().map(|(_, label)| label).collect())
}

fn string_values(df: &DataFrame, column: &str) -> Result<Column> {
    Ok(df
        .column(column)
        .map_err(|_| FeatureError::MissingColumn(column.to_string()))?
        .cast(&DataType::String)?)
}

/// Fitted one-hot parameters for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotParams {
    /// Source column
    pub column: String,
    /// Dropped reference category: the smallest observed value, compared
    /// numerically for numeric columns
    pub reference: Option<String>,
    /// Categories that get an indicator column, in output order
    pub indicators: Vec<String>,
}

impl OneHotParams {
    /// Output column names, `<column>_<category>`.
    pub fn output_columns(&self) -> Vec<String> {
        self.indicators
            .iter()
            .map(|category| format!("{}_{}", self.column, category))
            .collect()
    }
}

/// Drop-first one-hot encoder for a single column
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    column: String,
}

impl OneHotEncoder {
    /// Create an encoder for `column`.
    pub const fn new(column: String) -> Self {
        Self { column }
    }

    /// Column this encoder replaces.
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Transformer for OneHotEncoder {
    type Params = OneHotParams;

    fn name(&self) -> &'static str {
        "one_hot_encoder"
    }

    fn fit(&self, df: &DataFrame) -> Result<OneHotParams> {
        let mut observed = categories(df, &self.column)?.into_iter();
        let reference = observed.next();
        Ok(OneHotParams {
            column: self.column.clone(),
            reference,
            indicators: observed.collect(),
        })
    }

    /// Append one Int32 indicator per fitted category and drop the source.
    ///
    /// Rows holding the reference category, an unseen category or null get
    /// zero in every indicator.
    fn apply(&self, df: DataFrame, params: &OneHotParams) -> Result<DataFrame> {
        info!(column = %self.column, "Applying one-hot encoding");
        if df.column(&self.column).is_err() {
            return Err(FeatureError::MissingColumn(self.column.clone()));
        }

        let source = col(self.column.as_str()).cast(DataType::String);
        let indicators: Vec<Expr> = params
            .indicators
            .iter()
            .zip(params.output_columns())
            .map(|(category, name)| {
                when(source.clone().eq(lit(category.clone())))
                    .then(lit(1i32))
                    .otherwise(lit(0i32))
                    .alias(name)
            })
            .collect();

        let out = df
            .lazy()
            .with_columns(indicators)
            .collect()?
            .drop(&self.column)?;

        debug!(
            column = %self.column,
            reference = ?params.reference,
            indicators = params.indicators.len(),
            "One-hot encoding applied successfully"
        );
        Ok(out)
    }
}

/// Fitted frequency table for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyParams {
    /// Source column
    pub column: String,
    /// Share of non-null rows holding each category
    pub frequencies: BTreeMap<String, f64>,
}

impl FrequencyParams {
    /// Frequency of `category`; categories never seen while fitting get 0.
    pub fn frequency(&self, category: &str) -> f64 {
        self.frequencies.get(category).copied().unwrap_or(0.0)
    }
}

/// In-place frequency encoder for a single column
#[derive(Debug, Clone)]
pub struct FrequencyEncoder {
    column: String,
}

impl FrequencyEncoder {
    /// Create an encoder for `column`.
    pub const fn new(column: String) -> Self {
        Self { column }
    }

    /// Column this encoder replaces.
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Transformer for FrequencyEncoder {
    type Params = FrequencyParams;

    fn name(&self) -> &'static str {
        "frequency_encoder"
    }

    fn fit(&self, df: &DataFrame) -> Result<FrequencyParams> {
        let values = string_values(df, &self.column)?;

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for value in values.str()?.into_iter().flatten() {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }

        let total: usize = counts.values().sum();
        if total == 0 {
            return Err(FeatureError::EmptyColumn(self.column.clone()));
        }

        let frequencies = counts
            .into_iter()
            .map(|(category, count)| (category, count as f64 / total as f64))
            .collect();
        Ok(FrequencyParams {
            column: self.column.clone(),
            frequencies,
        })
    }

    fn apply(&self, mut df: DataFrame, params: &FrequencyParams) -> Result<DataFrame> {
        info!(column = %self.column, "Applying frequency encoding");
        let values = string_values(&df, &self.column)?;

        let encoded: Vec<Option<f64>> = values
            .str()?
            .into_iter()
            .map(|value| value.map(|v| params.frequency(v)))
            .collect();
        df.with_column(Column::new(self.column.as_str().into(), encoded))?;

        debug!(
            column = %self.column,
            categories = params.frequencies.len(),
            "Frequency encoding applied successfully"
        );
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn indicator(df: &DataFrame, name: &str) -> Vec<i32> {
        df.column(name)
            .unwrap()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_one_hot_drop_first() {
        let df = df![
            "Division" => ["A", "A", "B"],
            "X1" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let (out, params) = OneHotEncoder::new("Division".to_string())
            .fit_apply(df)
            .unwrap();

        assert_eq!(params.reference.as_deref(), Some("A"));
        assert_eq!(out.get_column_names_str(), ["X1", "Division_B"]);
        assert_eq!(indicator(&out, "Division_B"), vec![0, 0, 1]);
    }

    #[test]
    fn test_one_hot_at_most_one_indicator() {
        let df = df!["Division" => ["c", "a", "b", "a", "c"]].unwrap();

        let (out, params) = OneHotEncoder::new("Division".to_string())
            .fit_apply(df)
            .unwrap();

        assert_eq!(params.indicators, vec!["b".to_string(), "c".to_string()]);
        let b = indicator(&out, "Division_b");
        let c = indicator(&out, "Division_c");
        let source = ["c", "a", "b", "a", "c"];
        for row in 0..source.len() {
            let active = b[row] + c[row];
            if source[row] == "a" {
                assert_eq!(active, 0);
            } else {
                assert_eq!(active, 1);
            }
        }
    }

    #[test]
    fn test_one_hot_numeric_categories_and_unseen() {
        let train = df!["MajorGroup" => [10i64, 20, 20]].unwrap();
        let encoder = OneHotEncoder::new("MajorGroup".to_string());
        let params = encoder.fit(&train).unwrap();
        assert_eq!(params.output_columns(), vec!["MajorGroup_20".to_string()]);

        let unseen = df!["MajorGroup" => [20i64, 99]].unwrap();
        let out = encoder.apply(unseen, &params).unwrap();
        assert_eq!(indicator(&out, "MajorGroup_20"), vec![1, 0]);
    }

    #[test]
    fn test_one_hot_integer_categories_sort_by_value() {
        let df = df!["MajorGroup" => [35i64, 9, 10, 9]].unwrap();

        let (out, params) = OneHotEncoder::new("MajorGroup".to_string())
            .fit_apply(df)
            .unwrap();

        assert_eq!(params.reference.as_deref(), Some("9"));
        assert_eq!(params.indicators, vec!["10".to_string(), "35".to_string()]);
        assert_eq!(indicator(&out, "MajorGroup_10"), vec![0, 0, 1, 0]);
        assert_eq!(indicator(&out, "MajorGroup_35"), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_one_hot_missing_column_fails() {
        let df = df!["X1" => [1.0]].unwrap();
        let err = OneHotEncoder::new("Division".to_string())
            .fit_apply(df)
            .unwrap_err();
        assert_eq!(err.column(), Some("Division"));
        assert_eq!(err.component(), Some("one_hot_encoder"));
    }

    #[test]
    fn test_frequency_encoding_proportions() {
        let df = df![
            "MajorGroup" => ["x", "y", "x", "z"],
            "X1" => [1.0, 2.0, 3.0, 4.0],
        ]
        .unwrap();

        let (out, params) = FrequencyEncoder::new("MajorGroup".to_string())
            .fit_apply(df)
            .unwrap();

        assert_eq!(out.get_column_names_str(), ["MajorGroup", "X1"]);
        let encoded: Vec<f64> = out
            .column("MajorGroup")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(encoded, vec![0.5, 0.25, 0.5, 0.25]);

        let total: f64 = params.frequencies.values().sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_frequency_unseen_category_is_zero() {
        let encoder = FrequencyEncoder::new("MajorGroup".to_string());
        let params = encoder.fit(&df!["MajorGroup" => [1i64, 1, 2]].unwrap()).unwrap();

        let out = encoder
            .apply(df!["MajorGroup" => [2i64, 3]].unwrap(), &params)
            .unwrap();

        let encoded = out.column("MajorGroup").unwrap().f64().unwrap();
        assert_abs_diff_eq!(encoded.get(0).unwrap(), 1.0 / 3.0, epsilon = 1e-12);
        assert_eq!(encoded.get(1), Some(0.0));
    }

    #[test]
    fn test_frequency_missing_column_fails() {
        let df = df!["X1" => [1.0]].unwrap();
        assert!(matches!(
            FrequencyEncoder::new("MajorGroup".to_string()).fit(&df),
            Err(FeatureError::MissingColumn(_))
        ));
    }
}

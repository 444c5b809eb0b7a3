//! Label Mapper
//!
//! Maps the categorical target (`alive` / `failed`) to a binary code. Unknown
//! values are either a typed failure or, when explicitly allowed, null.

use crate::config::LabelPolicy;
use crate::transformer::Transformer;
use crate::{FeatureError, Result};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Maps a categorical target column to numeric codes
#[derive(Debug, Clone)]
pub struct LabelMapper {
    column: String,
    mapping: BTreeMap<String, i32>,
    policy: LabelPolicy,
}

impl LabelMapper {
    /// Create a mapper for `column` using `mapping`.
    pub const fn new(column: String, mapping: BTreeMap<String, i32>, policy: LabelPolicy) -> Self {
        Self {
            column,
            mapping,
            policy,
        }
    }

    /// Target column this mapper rewrites.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Map a single label.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::UnknownCategory`] (with row 0) if the value is
    /// not in the label map; [`LabelMapper::map_column`] fills in the row.
    pub fn map_value(&self, value: &str) -> Result<i32> {
        self.mapping
            .get(value)
            .copied()
            .ok_or_else(|| FeatureError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
                row: 0,
            })
    }

    /// Replace the target column with its numeric codes.
    ///
    /// Returns the table and the number of values mapped to null under
    /// [`LabelPolicy::NullOnUnknown`]. Null inputs stay null.
    pub fn map_column(&self, mut df: DataFrame) -> Result<(DataFrame, usize)> {
        info!(column = %self.column, "Applying label encoding");

        let source = df
            .column(&self.column)
            .map_err(|_| FeatureError::MissingColumn(self.column.clone()))?
            .cast(&DataType::String)?;

        let mut unknown = 0usize;
        let mut codes: Vec<Option<i32>> = Vec::with_capacity(source.len());
        for (row, value) in source.str()?.into_iter().enumerate() {
            let code = match value {
                None => None,
                Some(label) => match (self.map_value(label), self.policy) {
                    (Ok(code), _) => Some(code),
                    (Err(_), LabelPolicy::NullOnUnknown) => {
                        unknown += 1;
                        None
                    }
                    (Err(_), LabelPolicy::Strict) => {
                        return Err(FeatureError::UnknownCategory {
                            column: self.column.clone(),
                            value: label.to_string(),
                            row,
                        });
                    }
                },
            };
            codes.push(code);
        }

        df.with_column(Column::new(self.column.as_str().into(), codes))?;

        if unknown > 0 {
            warn!(column = %self.column, unknown, "Unrecognized labels mapped to null");
        }
        debug!(column = %self.column, "Label encoding applied successfully");
        Ok((df, unknown))
    }
}

impl Transformer for LabelMapper {
    type Params = ();

    fn name(&self) -> &'static str {
        "label_mapper"
    }

    fn fit(&self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn apply(&self, df: DataFrame, _params: &()) -> Result<DataFrame> {
        self.map_column(df).map(|(df, _)| df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn mapper(policy: LabelPolicy) -> LabelMapper {
        LabelMapper::new(
            "status_label".to_string(),
            BTreeMap::from([("alive".to_string(), 0), ("failed".to_string(), 1)]),
            policy,
        )
    }

    #[rstest]
    #[case("alive", 0)]
    #[case("failed", 1)]
    fn test_map_value_known(#[case] label: &str, #[case] expected: i32) {
        assert_eq!(mapper(LabelPolicy::Strict).map_value(label).unwrap(), expected);
    }

    #[test]
    fn test_map_value_unknown_is_typed_failure() {
        let err = mapper(LabelPolicy::Strict).map_value("bankrupt").unwrap_err();
        assert!(matches!(err, FeatureError::UnknownCategory { ref value, .. } if value == "bankrupt"));
    }

    #[test]
    fn test_map_column_binary_codes() {
        let df = df![
            "status_label" => ["alive", "failed", "alive"],
            "X1" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let (out, unknown) = mapper(LabelPolicy::Strict).map_column(df).unwrap();

        assert_eq!(unknown, 0);
        assert_eq!(out.get_column_names_str(), ["status_label", "X1"]);
        let codes: Vec<Option<i32>> = out
            .column("status_label")
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(codes, vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn test_strict_policy_reports_row() {
        let df = df!["status_label" => ["alive", "zombie"]].unwrap();

        let err = mapper(LabelPolicy::Strict).map_column(df).unwrap_err();

        assert!(matches!(
            err,
            FeatureError::UnknownCategory { ref value, row: 1, .. } if value == "zombie"
        ));
    }

    #[test]
    fn test_null_policy_maps_unknown_to_null() {
        let df = df!["status_label" => ["failed", "zombie", "alive"]].unwrap();

        let (out, unknown) = mapper(LabelPolicy::NullOnUnknown).map_column(df).unwrap();

        assert_eq!(unknown, 1);
        let codes = out.column("status_label").unwrap().i32().unwrap();
        assert_eq!(codes.get(0), Some(1));
        assert_eq!(codes.get(1), None);
        assert_eq!(codes.get(2), Some(0));
        assert_eq!(codes.null_count(), 1);
    }

    #[test]
    fn test_missing_target_column() {
        let df = df!["X1" => [1.0]].unwrap();
        assert!(matches!(
            mapper(LabelPolicy::Strict).apply(df, &()),
            Err(FeatureError::MissingColumn(_))
        ));
    }
}

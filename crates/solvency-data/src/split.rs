//! Feature/target separation for the model-building stage.

use crate::{DataError, Result};
use polars::prelude::*;
use tracing::info;

/// Split a transformed table into its feature columns and the target column.
///
/// # Errors
///
/// Returns [`DataError::MissingColumn`] if `target` is absent.
pub fn split_features_target(df: &DataFrame, target: &str) -> Result<(DataFrame, Column)> {
    info!(target, "Splitting features and target column");

    let y = df
        .column(target)
        .map_err(|_| DataError::MissingColumn(target.to_string()))?
        .clone();
    let x = df.drop(target)?;

    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_features_target() {
        let df = df![
            "X1" => [0.5, -0.5],
            "status_label" => [0i32, 1],
            "Division_B" => [0i32, 1],
        ]
        .unwrap();

        let (x, y) = split_features_target(&df, "status_label").unwrap();

        assert_eq!(x.get_column_names_str(), ["X1", "Division_B"]);
        assert_eq!(y.name().as_str(), "status_label");
        assert_eq!(y.len(), 2);
    }

    #[test]
    fn test_split_missing_target() {
        let df = df!["X1" => [0.5]].unwrap();
        assert!(matches!(
            split_features_target(&df, "status_label"),
            Err(DataError::MissingColumn(_))
        ));
    }
}

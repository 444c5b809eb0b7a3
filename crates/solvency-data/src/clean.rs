//! Null and duplicate cleaning.
//!
//! Produces the table the transformation stage relies on: no identifier
//! columns, no missing values, no duplicate rows.

use crate::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for the cleaning stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Columns removed before cleaning; absent names are ignored
    pub drop_columns: Vec<String>,
    /// Remove every row with at least one null (default: true)
    pub drop_nulls: bool,
    /// Remove duplicate rows, keeping the first occurrence (default: true)
    pub drop_duplicates: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            drop_columns: vec!["Unnamed: 0".to_string(), "company_name".to_string()],
            drop_nulls: true,
            drop_duplicates: true,
        }
    }
}

/// Counts of what the cleaning stage removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningStats {
    /// Columns dropped by name
    pub columns_dropped: usize,
    /// Rows removed because they contained a null
    pub null_rows_dropped: usize,
    /// Rows removed as duplicates
    pub duplicate_rows_dropped: usize,
}

/// Remove unwanted columns, null rows and duplicate rows.
///
/// Row order of the surviving rows is preserved.
pub fn clean(df: DataFrame, config: &CleaningConfig) -> Result<(DataFrame, CleaningStats)> {
    info!("Starting data cleaning process");
    let mut stats = CleaningStats::default();

    let present: Vec<&str> = config
        .drop_columns
        .iter()
        .map(String::as_str)
        .filter(|name| df.get_column_names().iter().any(|c| c.as_str() == *name))
        .collect();
    stats.columns_dropped = present.len();
    let mut df = df.drop_many(present);

    if config.drop_nulls {
        let before = df.height();
        df = df.lazy().drop_nulls(None).collect()?;
        stats.null_rows_dropped = before - df.height();
    }

    if config.drop_duplicates {
        let before = df.height();
        df = df
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        stats.duplicate_rows_dropped = before - df.height();
    }

    debug!(
        rows = df.height(),
        columns_dropped = stats.columns_dropped,
        null_rows_dropped = stats.null_rows_dropped,
        duplicate_rows_dropped = stats.duplicate_rows_dropped,
        "Data cleaning completed successfully"
    );
    Ok((df, stats))
}

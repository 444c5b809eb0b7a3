//! Schema and quality validation.
//!
//! The transformation stage assumes every required column is present, raw
//! indicators are numeric and nothing is null. This module checks those
//! assumptions up front and produces a report describing any violation.

use crate::{DataError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Columns the validation stage expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Columns that must exist and be numeric
    pub numeric_columns: Vec<String>,
    /// Columns that must exist with any dtype
    pub required_columns: Vec<String>,
    /// Treat any null as a validation failure (default: true)
    pub reject_nulls: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            numeric_columns: (1..=18).map(|i| format!("X{i}")).collect(),
            required_columns: vec![
                "status_label".to_string(),
                "Division".to_string(),
                "MajorGroup".to_string(),
            ],
            reject_nulls: true,
        }
    }
}

/// Outcome of validating a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub columns: usize,
    /// Null count for every column that has at least one null
    pub null_counts: BTreeMap<String, usize>,
    /// Required columns not found in the table
    pub missing_columns: Vec<String>,
    /// Numeric columns stored with a non-numeric dtype, with that dtype
    pub non_numeric_columns: BTreeMap<String, String>,
}

impl ValidationReport {
    /// Total number of nulls across all columns.
    pub fn total_nulls(&self) -> usize {
        self.null_counts.values().sum()
    }

    /// Whether the table satisfies the schema and contains no nulls.
    pub fn is_valid(&self) -> bool {
        self.missing_columns.is_empty()
            && self.non_numeric_columns.is_empty()
            && self.null_counts.is_empty()
    }

    /// Convert the first violation into an error, in schema, dtype, null order.
    pub fn into_result(self) -> Result<Self> {
        if let Some(column) = self.missing_columns.first() {
            return Err(DataError::MissingColumn(column.clone()));
        }
        if let Some((column, dtype)) = self.non_numeric_columns.iter().next() {
            return Err(DataError::NonNumericColumn {
                column: column.clone(),
                dtype: dtype.clone(),
            });
        }
        if let Some((column, count)) = self.null_counts.iter().next() {
            return Err(DataError::NullValues {
                column: column.clone(),
                count: *count,
            });
        }
        Ok(self)
    }
}

/// Inspect a table against the configured schema.
///
/// Never fails on data problems; they are recorded in the report. Call
/// [`ValidationReport::into_result`] to turn a failed report into an error.
pub fn validate(df: &DataFrame, config: &ValidationConfig) -> ValidationReport {
    info!("Starting data validation process");

    let mut report = ValidationReport {
        rows: df.height(),
        columns: df.width(),
        ..Default::default()
    };

    for name in config.numeric_columns.iter().chain(&config.required_columns) {
        if df.column(name).is_err() {
            report.missing_columns.push(name.clone());
        }
    }

    for name in &config.numeric_columns {
        if let Ok(column) = df.column(name) {
            if !column.dtype().is_primitive_numeric() {
                report
                    .non_numeric_columns
                    .insert(name.clone(), column.dtype().to_string());
            }
        }
    }

    if config.reject_nulls {
        for column in df.get_columns() {
            let count = column.null_count();
            if count > 0 {
                report.null_counts.insert(column.name().to_string(), count);
            }
        }
    }

    if report.is_valid() {
        debug!(rows = report.rows, columns = report.columns, "Data validation completed successfully");
    } else {
        warn!(
            missing = ?report.missing_columns,
            non_numeric = ?report.non_numeric_columns,
            nulls = report.total_nulls(),
            "Data validation found problems"
        );
    }
    report
}

/// Fail with [`DataError::MissingColumn`] on the first absent column.
pub fn require_columns<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<()> {
    for name in columns {
        let name = name.as_ref();
        if df.column(name).is_err() {
            return Err(DataError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

/// Cast the given columns to Float64.
///
/// Integer columns are widened; string or other non-numeric columns are a
/// domain failure rather than being silently turned into nulls.
pub fn coerce_numeric<S: AsRef<str>>(df: DataFrame, columns: &[S]) -> Result<DataFrame> {
    require_columns(&df, columns)?;

    let mut casts = Vec::with_capacity(columns.len());
    for name in columns {
        let name = name.as_ref();
        let dtype = df.column(name)?.dtype();
        if !dtype.is_primitive_numeric() {
            return Err(DataError::NonNumericColumn {
                column: name.to_string(),
                dtype: dtype.to_string(),
            });
        }
        casts.push(col(name).cast(DataType::Float64));
    }

    Ok(df.lazy().with_columns(casts).collect()?)
}

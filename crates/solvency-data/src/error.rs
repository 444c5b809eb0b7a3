//! Error types for data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Source file could not be read or parsed as CSV
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that was being read
        path: PathBuf,
        /// Underlying polars error
        source: polars::prelude::PolarsError,
    },

    /// Destination file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        /// File that was being written
        path: PathBuf,
        /// Underlying polars error
        source: polars::prelude::PolarsError,
    },

    /// Required column is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Column expected to be numeric has another dtype
    #[error("Column {column} is not numeric (found {dtype})")]
    NonNumericColumn {
        /// Offending column
        column: String,
        /// Dtype found in the table
        dtype: String,
    },

    /// Column contains nulls where none are allowed
    #[error("Column {column} contains {count} null value(s)")]
    NullValues {
        /// Offending column
        column: String,
        /// Number of nulls found
        count: usize,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Column name carried by schema and domain errors, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::MissingColumn(column) => Some(column),
            Self::NonNumericColumn { column, .. } | Self::NullValues { column, .. } => Some(column),
            _ => None,
        }
    }
}

//! Error types for feature transformation.

use solvency_data::DataError;
use thiserror::Error;

/// Result type for feature transformation.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors that can occur while fitting or applying a transformation.
#[derive(Debug, Error)]
pub enum FeatureError {
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

    /// Label value outside the configured label map
    #[error("Unrecognized category {value:?} in column {column} at row {row}")]
    UnknownCategory {
        /// Column being mapped
        column: String,
        /// Value that has no mapping
        value: String,
        /// Zero-based row index
        row: usize,
    },

    /// Column has no non-null values to fit statistics on
    #[error("Column {0} has no values to fit on")]
    EmptyColumn(String),

    /// Fitted parameters do not cover a column being transformed
    #[error("No fitted parameters for column {0}")]
    MissingParams(String),

    /// Configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure inside a named pipeline component
    #[error("{component} failed: {source}")]
    Component {
        /// Component that failed
        component: &'static str,
        /// Underlying error
        #[source]
        source: Box<Self>,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Other data-layer error
    #[error("Data error: {0}")]
    Data(DataError),
}

impl FeatureError {
    /// Attach the name of the component that produced this error.
    pub fn in_component(self, component: &'static str) -> Self {
        Self::Component {
            component,
            source: Box::new(self),
        }
    }

    /// Column name carried by this error, looking through component context.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::MissingColumn(column)
            | Self::EmptyColumn(column)
            | Self::MissingParams(column) => Some(column),
            Self::NonNumericColumn { column, .. } | Self::UnknownCategory { column, .. } => {
                Some(column)
            }
            Self::Component { source, .. } => source.column(),
            Self::Data(err) => err.column(),
            _ => None,
        }
    }

    /// Name of the innermost component that failed, if known.
    pub fn component(&self) -> Option<&'static str> {
        match self {
            Self::Component { component, source } => source.component().or(Some(*component)),
            _ => None,
        }
    }
}

impl From<DataError> for FeatureError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::MissingColumn(column) => Self::MissingColumn(column),
            DataError::NonNumericColumn { column, dtype } => {
                Self::NonNumericColumn { column, dtype }
            }
            DataError::Polars(err) => Self::Polars(err),
            other => Self::Data(other),
        }
    }
}

//! Per-column summary of a fitted transformation.
//!
//! Flattens [`TransformParams`] into one row per output column so the fitted
//! clip bounds and scaling moments can be inspected or diffed between runs.

use crate::export::{ExportError, ExportFormat, Exporter, csv_string, json_string};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solvency_features::TransformParams;
use std::fmt;

/// How a column was produced by the transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Raw indicator, winsorized then standardized
    Raw,
    /// Engineered ratio, log-compressed then standardized
    Ratio,
    /// Standardized without clipping or compression
    Scaled,
    /// One-hot indicator column
    Indicator,
    /// Frequency-encoded nominal column
    Frequency,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Raw => "raw",
            Self::Ratio => "ratio",
            Self::Scaled => "scaled",
            Self::Indicator => "indicator",
            Self::Frequency => "frequency",
        };
        f.write_str(name)
    }
}

/// Fitted statistics for one output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Output column name.
    pub column: String,

    /// How the column was produced.
    pub role: ColumnRole,

    /// Lower clip bound, for winsorized columns.
    pub lower: Option<f64>,

    /// Upper clip bound, for winsorized columns.
    pub upper: Option<f64>,

    /// Mean used for standardization.
    pub mean: Option<f64>,

    /// Standard deviation used for standardization.
    pub std: Option<f64>,
}

/// Summary of a whole fitted transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSummary {
    /// When the parameters were fitted.
    pub fitted_at: DateTime<Utc>,

    /// Rows in the fitting table.
    pub rows: usize,

    /// One entry per output column.
    pub columns: Vec<ColumnSummary>,
}

impl TransformSummary {
    /// Build the summary from fitted parameters.
    ///
    /// Standardized columns come first in name order, followed by the
    /// encoded columns in configuration order.
    pub fn from_params(params: &TransformParams) -> Self {
        let mut columns = Vec::new();

        for (column, moments) in &params.scale.moments {
            let bounds = params.winsorize.bounds.get(column);
            let role = if bounds.is_some() {
                ColumnRole::Raw
            } else if params.scale.log_columns.contains(column) {
                ColumnRole::Ratio
            } else {
                ColumnRole::Scaled
            };
            columns.push(ColumnSummary {
                column: column.clone(),
                role,
                lower: bounds.map(|b| b.lower),
                upper: bounds.map(|b| b.upper),
                mean: Some(moments.mean),
                std: Some(moments.std),
            });
        }

        for one_hot in &params.one_hot {
            columns.extend(one_hot.output_columns().into_iter().map(|column| {
                ColumnSummary {
                    column,
                    role: ColumnRole::Indicator,
                    lower: None,
                    upper: None,
                    mean: None,
                    std: None,
                }
            }));
        }

        for frequency in &params.frequency {
            columns.push(ColumnSummary {
                column: frequency.column.clone(),
                role: ColumnRole::Frequency,
                lower: None,
                upper: None,
                mean: None,
                std: None,
            });
        }

        Self {
            fitted_at: params.fitted_at,
            rows: params.rows,
            columns,
        }
    }

    /// Look up the summary of one output column.
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Render the summary as a fixed-width text table.
    pub fn to_ascii_table(&self) -> String {
        fn cell(value: Option<f64>) -> String {
            value.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string())
        }

        let mut output = String::new();

        output.push_str(&format!("\nTransformation Summary ({} rows)\n", self.rows));
        output.push_str(&format!("Fitted: {}\n", self.fitted_at.format("%Y-%m-%d %H:%M:%S UTC")));
        output.push_str(&"=".repeat(86));
        output.push('\n');

        output.push_str(&format!(
            "{:<24} {:<10} {:>12} {:>12} {:>12} {:>12}\n",
            "Column", "Role", "Lower", "Upper", "Mean", "Std"
        ));
        output.push_str(&"-".repeat(86));
        output.push('\n');

        for column in &self.columns {
            output.push_str(&format!(
                "{:<24} {:<10} {:>12} {:>12} {:>12} {:>12}\n",
                column.column,
                column.role.to_string(),
                cell(column.lower),
                cell(column.upper),
                cell(column.mean),
                cell(column.std),
            ));
        }

        output.push_str(&"=".repeat(86));
        output.push('\n');
        output
    }
}

impl Exporter for TransformSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string(&self.columns),
            ExportFormat::Json | ExportFormat::PrettyJson => json_string(self, format),
        }
    }
}

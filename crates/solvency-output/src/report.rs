//! Run reports and registry listings.

use crate::export::{ExportError, ExportFormat, Exporter, csv_string, json_string};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solvency_features::RatioInfo;
use std::path::PathBuf;

/// Outcome of one executed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage name.
    pub stage: String,

    /// Rows in the stage output.
    pub rows: usize,

    /// Columns in the stage output.
    pub columns: usize,

    /// File the stage persisted.
    pub output: PathBuf,
}

/// A report of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the last stage finished.
    pub finished_at: DateTime<Utc>,

    /// Executed stages, in order.
    pub stages: Vec<StageReport>,
}

impl RunReport {
    /// Start a report now.
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            stages: Vec::new(),
        }
    }

    /// Record a finished stage.
    pub fn record(&mut self, stage: StageReport) {
        self.finished_at = Utc::now();
        self.stages.push(stage);
    }

    /// Render the report as a fixed-width text table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\nPipeline run: {} to {}\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            self.finished_at.format("%Y-%m-%d %H:%M:%S")
        ));
        output.push_str(&"=".repeat(96));
        output.push('\n');
        output.push_str(&format!(
            "{:<12} {:>10} {:>10}  {}\n",
            "Stage", "Rows", "Columns", "Output"
        ));
        output.push_str(&"-".repeat(96));
        output.push('\n');

        for stage in &self.stages {
            output.push_str(&format!(
                "{:<12} {:>10} {:>10}  {}\n",
                stage.stage,
                stage.rows,
                stage.columns,
                stage.output.display()
            ));
        }

        output.push_str(&"=".repeat(96));
        output.push('\n');
        output
    }
}

impl Exporter for RunReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string(&self.stages),
            ExportFormat::Json | ExportFormat::PrettyJson => json_string(self, format),
        }
    }
}

/// Render the ratio registry as a text table.
pub fn ratio_table(ratios: &[RatioInfo]) -> String {
    let mut output = String::new();

    output.push_str(&format!("\nFinancial Ratios ({})\n", ratios.len()));
    output.push_str(&"=".repeat(96));
    output.push('\n');
    output.push_str(&format!(
        "{:<22} {:<14} {:<24} {}\n",
        "Ratio", "Category", "Formula", "Description"
    ));
    output.push_str(&"-".repeat(96));
    output.push('\n');

    for info in ratios {
        output.push_str(&format!(
            "{:<22} {:<14} {:<24} {}\n",
            info.name,
            info.category.as_str(),
            info.formula(),
            info.description
        ));
    }

    output.push_str(&"=".repeat(96));
    output.push('\n');
    output
}

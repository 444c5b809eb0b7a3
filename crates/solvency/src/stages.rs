//! Stage driver.
//!
//! Each stage reads the file the previous stage wrote and persists its own
//! output only after all of its work has succeeded.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, Stage, StageContext};
use solvency_data::{ValidationReport, clean, ingest, read_csv, validate, write_csv};
use solvency_features::{FeaturePipeline, TransformParams};
use solvency_output::{
    ExportFormat, Exporter, RunReport, StageReport, TransformSummary, load_params, write_file,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of the transform stage.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    /// Shape and location of the transformed table
    pub report: StageReport,
    /// Parameters used, fitted or loaded
    pub params: TransformParams,
    /// Whether the parameters were fitted in this run
    pub fitted: bool,
}

/// Runs pipeline stages against the configured data directory
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    features: FeaturePipeline,
}

fn stage_report(stage: Stage, (rows, columns): (usize, usize), output: PathBuf) -> StageReport {
    StageReport {
        stage: stage.to_string(),
        rows,
        columns,
        output,
    }
}

impl Pipeline {
    /// Create a driver for `config`.
    ///
    /// # Errors
    ///
    /// Fails if the feature configuration is inconsistent.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let features =
            FeaturePipeline::new(config.features.clone()).map_err(PipelineError::InvalidConfig)?;
        Ok(Self { config, features })
    }

    /// Configuration in use.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Copy `source` into the data directory as the raw table.
    pub fn ingest(&self, source: &Path) -> Result<StageReport> {
        info!(source = %source.display(), "Starting data ingestion");
        let output = self.config.paths.raw();
        let shape = ingest(source, &output).at(Stage::Ingest)?;
        Ok(stage_report(Stage::Ingest, shape, output))
    }

    /// Clean the raw table.
    pub fn clean(&self) -> Result<StageReport> {
        let output = self.config.paths.cleaned();
        let df = read_csv(&self.config.paths.raw()).at(Stage::Clean)?;
        let (mut df, stats) = clean(df, &self.config.cleaning).at(Stage::Clean)?;
        info!(
            null_rows = stats.null_rows_dropped,
            duplicate_rows = stats.duplicate_rows_dropped,
            "Data cleaning completed"
        );
        write_csv(&mut df, &output).at(Stage::Clean)?;
        Ok(stage_report(Stage::Clean, df.shape(), output))
    }

    /// Validate the cleaned table and persist it if it passes.
    ///
    /// # Errors
    ///
    /// Fails on the first missing column, non-numeric raw column or null, in
    /// that order. Nothing is written in that case.
    pub fn validate(&self) -> Result<(ValidationReport, StageReport)> {
        let output = self.config.paths.validated();
        let mut df = read_csv(&self.config.paths.cleaned()).at(Stage::Validate)?;

        let report = validate(&df, &self.config.validation)
            .into_result()
            .at(Stage::Validate)?;

        write_csv(&mut df, &output).at(Stage::Validate)?;
        Ok((report, stage_report(Stage::Validate, df.shape(), output)))
    }

    /// Transform the validated table.
    ///
    /// Without `params` the pipeline is fitted and the fitted parameters and
    /// their summary are persisted next to the table. With `params` the stored
    /// parameters are replayed and nothing but the table is written.
    ///
    /// Every output is serialized before the first file is touched. If a
    /// later write fails, the files written by this call are removed again.
    pub fn transform(&self, params: Option<&Path>) -> Result<TransformOutcome> {
        let paths = &self.config.paths;
        let output = paths.transformed();
        let df = read_csv(&paths.validated()).at(Stage::Transform)?;

        let (mut df, params, fitted) = match params {
            Some(path) => {
                info!(params = %path.display(), "Loading fitted parameters");
                let params = load_params(path).at(Stage::Transform)?;
                let df = self.features.transform(df, &params).at(Stage::Transform)?;
                (df, params, false)
            }
            None => {
                let (df, params) = self.features.fit_transform(df).at(Stage::Transform)?;
                (df, params, true)
            }
        };

        let companions = if fitted {
            let summary_path = paths.summary();
            let summary_format = ExportFormat::from_path(&summary_path).unwrap_or(ExportFormat::Csv);
            let json = params
                .export_to_string(ExportFormat::PrettyJson)
                .at(Stage::Transform)?;
            let summary = TransformSummary::from_params(&params)
                .export_to_string(summary_format)
                .at(Stage::Transform)?;
            vec![(paths.params(), json), (summary_path, summary)]
        } else {
            Vec::new()
        };

        write_csv(&mut df, &output).at(Stage::Transform)?;
        for (i, (path, content)) in companions.iter().enumerate() {
            if let Err(e) = write_file(path, content) {
                warn!(path = %path.display(), "Removing transform outputs after failed write");
                let _ = fs::remove_file(&output);
                for (written, _) in &companions[..i] {
                    let _ = fs::remove_file(written);
                }
                return Err(e).at(Stage::Transform);
            }
        }

        Ok(TransformOutcome {
            report: stage_report(Stage::Transform, df.shape(), output),
            params,
            fitted,
        })
    }

    /// Run every stage from `source`, fitting the transformation.
    pub fn run(&self, source: &Path) -> Result<RunReport> {
        let mut run = RunReport::start();
        run.record(self.ingest(source)?);
        run.record(self.clean()?);
        run.record(self.validate()?.1);
        run.record(self.transform(None)?.report);
        info!(stages = run.stages.len(), "Pipeline run completed");
        Ok(run)
    }
}

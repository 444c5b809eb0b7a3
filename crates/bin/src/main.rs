//! Solvency CLI binary.
//!
//! Runs the bankruptcy-prediction feature pipeline stage by stage or end to end.

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use solvency::features::available_ratios;
use solvency::output::{ExportFormat, Exporter, TransformSummary, ratio_table};
use solvency::{LoggingConfig, Pipeline, PipelineConfig, load_config};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "solvency")]
#[command(about = "Solvency: bankruptcy-prediction feature pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file layered over the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a source CSV into the data directory
    Ingest {
        /// Source CSV file
        #[arg(long)]
        source: PathBuf,
    },

    /// Drop unwanted columns, rows with nulls and duplicates
    Clean,

    /// Check schema, dtypes and nulls of the cleaned table
    Validate,

    /// Build the model-ready feature table
    Transform {
        /// Apply previously fitted parameters instead of fitting
        #[arg(long)]
        params: Option<PathBuf>,
    },

    /// Run every stage from a source CSV
    Run {
        /// Source CSV file
        #[arg(long)]
        source: PathBuf,

        /// Also write the run report (.csv or .json)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the financial ratios
    Ratios,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("loading configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.paths.data_dir = data_dir;
    }
    let _guard = init_tracing(&config.logging, cli.verbose)?;
    info!(data_dir = %config.paths.data_dir.display(), "Configuration loaded");

    match cli.command {
        Commands::Ingest { source } => {
            let report = pipeline(config)?.ingest(&source)?;
            println!(
                "Ingested {} rows x {} columns into {}",
                report.rows,
                report.columns,
                report.output.display()
            );
        }
        Commands::Clean => {
            let report = pipeline(config)?.clean()?;
            println!(
                "Cleaned table: {} rows x {} columns in {}",
                report.rows,
                report.columns,
                report.output.display()
            );
        }
        Commands::Validate => {
            let (validation, report) = pipeline(config)?.validate()?;
            println!(
                "Validation passed: {} rows x {} columns, {} nulls",
                validation.rows,
                validation.columns,
                validation.total_nulls()
            );
            println!("Validated table saved to {}", report.output.display());
        }
        Commands::Transform { params } => {
            transform(config, params.as_deref())?;
        }
        Commands::Run { source, report } => {
            let pipeline = pipeline(config)?;
            let run = pipeline.run(&source)?;
            print!("{}", run.to_ascii_table());
            if let Some(path) = report {
                let format = ExportFormat::from_path(&path)
                    .ok_or_else(|| anyhow!("unsupported report format: {}", path.display()))?;
                run.export_to_file(&path, format)
                    .with_context(|| format!("writing run report {}", path.display()))?;
                info!(path = %path.display(), "Run report saved");
            }
            let params = solvency::output::load_params(&pipeline.config().paths.params())?;
            print!("{}", TransformSummary::from_params(&params).to_ascii_table());
        }
        Commands::Ratios => {
            print!("{}", ratio_table(&available_ratios()));
        }
    }

    Ok(())
}

fn pipeline(config: PipelineConfig) -> anyhow::Result<Pipeline> {
    Pipeline::new(config).context("building pipeline")
}

fn transform(config: PipelineConfig, params: Option<&Path>) -> anyhow::Result<()> {
    let pipeline = pipeline(config)?;
    let outcome = pipeline.transform(params)?;

    println!(
        "Transformed table: {} rows x {} columns in {}",
        outcome.report.rows,
        outcome.report.columns,
        outcome.report.output.display()
    );
    if outcome.fitted {
        let paths = &pipeline.config().paths;
        println!("Fitted parameters saved to {}", paths.params().display());
        println!("Summary saved to {}", paths.summary().display());
        print!(
            "{}",
            TransformSummary::from_params(&outcome.params).to_ascii_table()
        );
    }
    Ok(())
}

/// Human-readable stderr logging plus an optional JSON log file.
///
/// `RUST_LOG` wins over `-v`, which wins over the configured level. The
/// returned guard flushes the file writer when dropped.
fn init_tracing(logging: &LoggingConfig, verbose: u8) -> anyhow::Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let (json_layer, guard) = match &logging.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, &logging.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

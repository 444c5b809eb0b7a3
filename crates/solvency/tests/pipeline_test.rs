//! End-to-end tests running every stage against CSV files on disk.

use solvency::data::read_csv;
use solvency::{Pipeline, PipelineConfig, PipelineError, Stage};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str = "Unnamed: 0,company_name,status_label,X1,X2,X3,X4,X5,X6,X7,X8,X9,X10,X11,X12,X13,X14,X15,X16,X17,X18,Division,MajorGroup";

/// Write a source table with `rows` company-years, one duplicate row and one
/// row with a missing value.
fn write_source(dir: &Path, rows: usize) -> PathBuf {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    let mut row = |i: usize, label: &str, x5: &str| {
        let mut line = format!("{i},C_{i},{label}");
        for x in 1..=18 {
            if x == 5 {
                write!(line, ",{x5}").unwrap();
            } else {
                write!(line, ",{}", ((i * 13 + x * 7) % 29) as f64 * 3.5 - 20.0).unwrap();
            }
        }
        let division = ["D", "E", "G", "I"][i % 4];
        let group = [10, 20, 28, 35, 73][i % 5];
        writeln!(line, ",{division},{group}").unwrap();
        csv.push_str(&line);
    };

    for i in 0..rows {
        let label = if i % 6 == 0 { "failed" } else { "alive" };
        row(i, label, &format!("{}", i as f64 * 1.25));
    }
    // the same company-year twice, and a row with a gap
    row(3, "alive", "3.75");
    row(rows, "alive", "");

    let path = dir.join("american_bankruptcy.csv");
    std::fs::write(&path, csv).unwrap();
    path
}

fn pipeline(dir: &TempDir) -> Pipeline {
    let mut config = PipelineConfig::default();
    config.paths.data_dir = dir.path().join("data");
    Pipeline::new(config).unwrap()
}

#[test]
fn test_full_run_persists_every_stage() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 40);
    let pipeline = pipeline(&dir);
    let paths = &pipeline.config().paths;

    let run = pipeline.run(&source).unwrap();

    let stages: Vec<&str> = run.stages.iter().map(|s| s.stage.as_str()).collect();
    assert_eq!(stages, ["ingest", "clean", "validate", "transform"]);
    assert_eq!(run.stages[0].rows, 42);
    // duplicate and null rows removed
    assert_eq!(run.stages[1].rows, 40);
    assert_eq!(run.stages[3].rows, 40);

    for path in [
        paths.raw(),
        paths.cleaned(),
        paths.validated(),
        paths.transformed(),
        paths.params(),
        paths.summary(),
    ] {
        assert!(path.exists(), "{} missing", path.display());
    }

    let transformed = read_csv(&paths.transformed()).unwrap();
    assert_eq!(transformed.height(), 40);
    assert!(transformed.column("company_name").is_err());
    assert!(transformed.column("Division").is_err());
    assert!(transformed.column("Division_E").is_ok());
    assert!(transformed.column("Debt_to_Equity").is_ok());
}

#[test]
fn test_transform_with_stored_params() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 30);
    let pipeline = pipeline(&dir);
    let params_path = pipeline.config().paths.params();
    pipeline.run(&source).unwrap();

    let outcome = pipeline.transform(Some(&params_path)).unwrap();

    assert!(!outcome.fitted);
    assert_eq!(outcome.params.rows, 30);
    assert_eq!(outcome.report.rows, 30);
}

#[test]
fn test_validation_failure_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 20);
    let mut config = PipelineConfig::default();
    config.paths.data_dir = dir.path().join("data");
    config.cleaning.drop_nulls = false;
    let pipeline = Pipeline::new(config).unwrap();

    pipeline.ingest(&source).unwrap();
    pipeline.clean().unwrap();
    let err = pipeline.validate().unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Validate));
    assert_eq!(err.column(), Some("X5"));
    assert!(!pipeline.config().paths.validated().exists());
}

#[test]
fn test_transform_without_validated_table() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir);

    let err = pipeline.transform(None).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Data {
            stage: Stage::Transform,
            ..
        }
    ));
}

#[test]
fn test_unknown_label_aborts_transform() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 12);
    let pipeline = pipeline(&dir);
    pipeline.ingest(&source).unwrap();
    pipeline.clean().unwrap();
    pipeline.validate().unwrap();

    // corrupt one label in the validated table
    let validated = pipeline.config().paths.validated();
    let text = std::fs::read_to_string(&validated).unwrap();
    std::fs::write(&validated, text.replacen("failed", "bankrupt", 1)).unwrap();

    let err = pipeline.transform(None).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Transform));
    assert_eq!(err.column(), Some("status_label"));
    assert!(!pipeline.config().paths.transformed().exists());
    assert!(!pipeline.config().paths.params().exists());
}

#[test]
fn test_failed_params_write_removes_table() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 12);
    let pipeline = pipeline(&dir);
    let paths = &pipeline.config().paths;
    pipeline.ingest(&source).unwrap();
    pipeline.clean().unwrap();
    pipeline.validate().unwrap();

    // a directory where the params file belongs
    std::fs::create_dir_all(paths.params()).unwrap();

    let err = pipeline.transform(None).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Export {
            stage: Stage::Transform,
            ..
        }
    ));
    assert!(!paths.transformed().exists());
    assert!(!paths.summary().exists());
    assert!(!solvency::data::staging_path(&paths.transformed()).exists());
}

#[test]
fn test_json_summary_follows_extension() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), 12);
    let mut config = PipelineConfig::default();
    config.paths.data_dir = dir.path().join("data");
    config.paths.transform_summary = "transform_summary.json".to_string();
    let pipeline = Pipeline::new(config).unwrap();

    pipeline.run(&source).unwrap();

    let text = std::fs::read_to_string(pipeline.config().paths.summary()).unwrap();
    assert!(text.trim_start().starts_with('{'));
}

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/solvency/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter, load_params, write_file};
pub use report::{RunReport, StageReport, ratio_table};
pub use summary::{ColumnRole, ColumnSummary, TransformSummary};

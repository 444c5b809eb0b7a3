#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/solvency/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod clean;
pub mod error;
pub mod io;
pub mod split;
pub mod validate;

pub use clean::{CleaningConfig, CleaningStats, clean};
pub use error::{DataError, Result};
pub use io::{ingest, read_csv, staging_path, write_csv};
pub use split::split_features_target;
pub use validate::{
    ValidationConfig, ValidationReport, coerce_numeric, require_columns, validate,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

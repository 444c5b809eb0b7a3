//! CSV input and output.
//!
//! Every stage of the pipeline reads one comma-separated file with a header
//! row and writes another. Both directions go through polars so that column
//! dtypes are inferred once at the boundary.

use crate::{DataError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read a header-first CSV file into a DataFrame.
///
/// # Errors
///
/// Returns [`DataError::Read`] if the file is missing or malformed.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    info!(path = %path.display(), "Reading data");

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(rows = df.height(), columns = df.width(), "Data read successfully");
    Ok(df)
}

/// Sibling path a file is staged under before being renamed into place.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write a DataFrame as CSV with a header row, creating parent directories.
///
/// The table is written to [`staging_path`] and renamed over `path` once
/// complete, so a failed write never leaves a truncated file behind.
///
/// # Errors
///
/// Returns [`DataError::Io`] if the directory or file cannot be created and
/// [`DataError::Write`] if serialization fails.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    info!(path = %path.display(), "Saving data");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path);
    let written = write_staged(df, path, &staging);
    if written.is_err() {
        let _ = fs::remove_file(&staging);
        return written;
    }

    debug!(rows = df.height(), columns = df.width(), "Data saved successfully");
    Ok(())
}

fn write_staged(df: &mut DataFrame, path: &Path, staging: &Path) -> Result<()> {
    let mut file = File::create(staging)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|source| DataError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    file.sync_all()?;
    drop(file);
    fs::rename(staging, path)?;
    Ok(())
}

/// Load the source file and persist it unchanged as the raw dataset.
///
/// Returns the shape of the ingested table as `(rows, columns)`.
pub fn ingest(source: &Path, dest: &Path) -> Result<(usize, usize)> {
    let mut df = read_csv(source)?;
    write_csv(&mut df, dest)?;
    Ok(df.shape())
}

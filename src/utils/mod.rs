//! Utilities for reading Parquet files and extracting Arrow values

pub mod arrow_utils;
pub mod logging;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;

use crate::error::{AnalyticsError, Result};
use logging::{log_operation_complete, log_operation_start, log_warning};

/// Validates that a directory exists and is a directory
///
/// # Errors
/// Returns an error if the directory does not exist or is not a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(AnalyticsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )));
    }
    Ok(())
}

/// Read a Parquet file into Arrow record batches
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid Parquet
pub fn read_parquet(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file", path);

    let file = File::open(path).map_err(|e| {
        AnalyticsError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open file {}: {}", path.display(), e),
        ))
    })?;

    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(batch_size)
        .build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    log_operation_complete("read", path, batches.len(), Some(start.elapsed()));
    Ok(batches)
}

/// Find all Parquet files in a directory, sorted by path
///
/// # Errors
/// Returns an error if the directory cannot be read
pub fn find_parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    log_operation_start("Searching for parquet files in", dir);
    validate_directory(dir)?;

    let parquet_files = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .filter_ok(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "parquet"))
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .sorted()
        .collect_vec();

    if parquet_files.is_empty() {
        log_warning("No Parquet files found in directory", Some(dir));
    } else {
        log_operation_complete("found", dir, parquet_files.len(), None);
    }

    Ok(parquet_files)
}

/// Load all Parquet files of a directory in parallel
///
/// Batches are returned in file order.
///
/// # Errors
/// Returns an error if the directory or any file cannot be read
pub fn load_parquet_files_parallel(dir: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let parquet_files = find_parquet_files(dir)?;
    if parquet_files.is_empty() {
        return Ok(Vec::new());
    }

    let per_file: Vec<Vec<RecordBatch>> = parquet_files
        .par_iter()
        .map(|path| read_parquet(path, batch_size))
        .collect::<Result<_>>()?;

    let batches = per_file.into_iter().flatten().collect_vec();
    log::info!(
        "Successfully loaded {} batches from {} Parquet files",
        batches.len(),
        parquet_files.len()
    );

    Ok(batches)
}

//! Async file discovery and opening

use std::path::{Path, PathBuf};

use tokio::fs::{self, File};

use crate::error::{AnalyticsError, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};
use crate::utils::validate_directory;

fn io_context(error: std::io::Error, context: String) -> AnalyticsError {
    AnalyticsError::Io(std::io::Error::new(error.kind(), format!("{context}: {error}")))
}

/// Find all Parquet files in a directory asynchronously, sorted by path
///
/// # Errors
/// Returns an error if directory reading fails
pub async fn find_parquet_files_async(dir: &Path) -> Result<Vec<PathBuf>> {
    log_operation_start("Searching for parquet files asynchronously in", dir);
    validate_directory(dir)?;

    let mut parquet_files = Vec::<PathBuf>::new();

    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| io_context(e, format!("Failed to read directory {}", dir.display())))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| io_context(e, "Failed to read directory entry".to_string()))?
    {
        let path = entry.path();
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| io_context(e, format!("Failed to read metadata for {}", path.display())))?;

        if metadata.is_file() && path.extension().is_some_and(|ext| ext == "parquet") {
            parquet_files.push(path);
        }
    }
    parquet_files.sort();

    if parquet_files.is_empty() {
        log_warning("No Parquet files found in directory", Some(dir));
    } else {
        log_operation_complete("found", dir, parquet_files.len(), None);
    }

    Ok(parquet_files)
}

/// Open a Parquet file for async reading
///
/// # Errors
/// Returns an error if the file cannot be opened
pub async fn open_parquet_file_async(path: &Path) -> Result<File> {
    File::open(path)
        .await
        .map_err(|e| io_context(e, format!("Failed to open file {}", path.display())))
}

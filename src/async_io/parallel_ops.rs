//! Concurrent loading of a directory of record store files

use std::path::Path;

use arrow::record_batch::RecordBatch;
use futures::stream::{self, StreamExt, TryStreamExt};

use super::batch_ops::read_parquet_async;
use super::file_ops::find_parquet_files_async;
use crate::error::Result;

/// Load every Parquet file of a directory with async IO
///
/// Up to one file per CPU is in flight at a time. Files are yielded in path
/// order, so the source position of each encounter does not depend on which
/// read finishes first.
///
/// # Errors
/// Returns an error if the directory or any file cannot be read
pub async fn load_parquet_files_parallel_async(
    dir: &Path,
    batch_size: usize,
) -> Result<Vec<RecordBatch>> {
    let files = find_parquet_files_async(dir).await?;
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let per_file: Vec<Vec<RecordBatch>> = stream::iter(&files)
        .map(|path| async move {
            read_parquet_async(path, batch_size)
                .await
                .inspect_err(|e| log::error!("Failed to load {}: {e}", path.display()))
        })
        .buffered(num_cpus::get())
        .try_collect()
        .await?;

    let batches: Vec<RecordBatch> = per_file.into_iter().flatten().collect();
    let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
    log::info!(
        "Loaded {rows} rows in {} batches from {} files in {}",
        batches.len(),
        files.len(),
        dir.display()
    );

    Ok(batches)
}

//! Async Parquet batch reading

use std::path::Path;
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;

use super::file_ops::open_parquet_file_async;
use crate::error::Result;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Read a Parquet file asynchronously into Arrow record batches
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid Parquet
pub async fn read_parquet_async(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file asynchronously", path);

    let file = open_parquet_file_async(path).await?;

    let stream = ParquetRecordBatchStreamBuilder::new(file)
        .await?
        .with_batch_size(batch_size)
        .build()?;

    let batches = stream.try_collect::<Vec<_>>().await?;

    log_operation_complete("read", path, batches.len(), Some(start.elapsed()));
    Ok(batches)
}

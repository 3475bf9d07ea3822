//! Async loading of encounters from the record store

use std::path::Path;

use crate::adapters::encounter::decode_encounters;
use crate::error::Result;
use crate::models::encounter::RawEncounter;

use super::batch_ops::read_parquet_async;
use super::parallel_ops::load_parquet_files_parallel_async;

/// Load encounters from a Parquet file or a directory of Parquet files
///
/// Reading is async; decoding runs on the calling task once all batches
/// are in memory.
///
/// # Errors
/// Returns an error if any file cannot be read or decoded
pub async fn load_encounters_async(path: &Path, batch_size: usize) -> Result<Vec<RawEncounter>> {
    let batches = if path.is_dir() {
        load_parquet_files_parallel_async(path, batch_size).await?
    } else {
        read_parquet_async(path, batch_size).await?
    };

    let mut encounters = Vec::with_capacity(batches.iter().map(|b| b.num_rows()).sum());
    for batch in &batches {
        encounters.extend(decode_encounters(batch)?);
    }

    log::info!(
        "Decoded {} encounters from {}",
        encounters.len(),
        path.display()
    );
    Ok(encounters)
}

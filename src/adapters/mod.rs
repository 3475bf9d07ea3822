//! Record store adapters
//!
//! Adapters turn Arrow record batches read from the record store into
//! domain records.

use std::fmt::Debug;

use arrow::record_batch::RecordBatch;

use crate::error::Result;

pub mod encounter;

pub use encounter::{EncounterAdapter, decode_encounters, load_encounters_from_dir, read_encounters};

/// Conversion of a record batch into domain records
pub trait RecordStoreAdapter<T>: Debug + Send + Sync {
    /// Convert every row of `batch`
    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<T>>;
}

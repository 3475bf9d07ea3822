//! Async Parquet loading
//!
//! Bulk reads of the record store with tokio and futures. The analytics
//! themselves are synchronous; this is the only suspension point.

pub mod batch_ops;
pub mod file_ops;
pub mod loader;
pub mod parallel_ops;

pub use batch_ops::read_parquet_async;
pub use file_ops::{find_parquet_files_async, open_parquet_file_async};
pub use loader::load_encounters_async;
pub use parallel_ops::load_parquet_files_parallel_async;

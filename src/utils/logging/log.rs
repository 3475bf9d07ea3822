//! Logging helpers
//!
//! Standard message shapes for record store I/O and pipeline stages, so the
//! batch log reads the same whichever loader or writer produced a line.

use std::path::Path;
use std::time::Duration;

/// Log the start of an operation on a file or directory
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log the completion of an operation on a file or directory
///
/// `operation` is past tense, e.g. "read" or "wrote"; `items` counts batches,
/// rows or files depending on the operation.
pub fn log_operation_complete(operation: &str, path: &Path, items: usize, elapsed: Option<Duration>) {
    match elapsed {
        Some(duration) => log::info!("{operation} {items} items ({}) in {duration:?}", path.display()),
        None => log::info!("{operation} {items} items ({})", path.display()),
    }
}

/// Log the completion of an in-memory pipeline stage
pub fn log_stage_complete(stage: &str, items: usize, elapsed: Duration) {
    let per_sec = items as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    log::info!("{stage}: {items} items in {elapsed:?} ({per_sec:.0}/s)");
}

/// Log a warning, optionally tied to a path
pub fn log_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{message}: {}", path.display()),
        None => log::warn!("{message}"),
    }
}

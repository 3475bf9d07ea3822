//! Domain models for hospitalization interval analytics
//!
//! This module contains the encounter model supplied by the record store,
//! the per-encounter analytic record and the data-quality taxonomy used to
//! report anomalies in both.

pub mod encounter;
pub mod quality;
pub mod record;

// Re-export commonly used types
pub use encounter::{AdmissionType, Encounter, Ingestion, RawEncounter, ingest};
pub use quality::{DataQualityIssue, DataQualityReport};
pub use record::EncounterRecord;

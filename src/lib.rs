//! Per-patient hospitalization interval analytics.
//!
//! Orders each patient's encounters chronologically, measures the gap from
//! one discharge to the next admission, classifies gaps into risk tiers,
//! segments episodes of care and aggregates the results into population
//! distributions, rankings, frequent-flyer cohorts and composite risk
//! scores. Input is read from Parquet through Arrow; output tables are
//! written back to Parquet.

pub mod adapters;
pub mod algorithm;
pub mod async_io;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod utils;

// Core types
pub use config::AnalyticsConfig;
pub use error::{AnalyticsError, Result};
pub use models::{DataQualityReport, Encounter, EncounterRecord, RawEncounter};

// Pipeline
pub use algorithm::pipeline::{Analysis, analyze};
pub use algorithm::risk::{RiskLabel, RiskTier};
pub use algorithm::statistics::{Dimension, Measure, RankOrder};

// Record store
pub use adapters::{decode_encounters, load_encounters_from_dir, read_encounters};
pub use async_io::load_encounters_async;

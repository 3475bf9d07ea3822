//! Configuration for the readmission analytics batch.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithm::statistics::ranking::RankOrder;
use crate::error::{AnalyticsError, Result};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Environment variable overriding the Parquet read batch size
pub const BATCH_SIZE_ENV: &str = "READMIT_BATCH_SIZE";

/// Configuration for an analytics batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Largest gap (in days) that still continues the current episode of care
    pub continuity_threshold_days: i64,
    /// Minimum readmission count for a patient to be reported as a frequent flyer
    pub frequent_flyer_min_readmissions: usize,
    /// Gap (in days, inclusive) under which a readmission counts as rapid
    pub rapid_readmission_days: i64,
    /// Number of buckets for bucket ranking (4 = quartiles, 10 = deciles)
    pub bucket_count: usize,
    /// Direction for ordinal and bucket ranks
    pub rank_order: RankOrder,
    /// Look-back window (in days) for counting prior admissions
    pub prior_admission_window_days: i64,
    /// Worker threads for the per-patient stage (defaults to the CPU count)
    pub num_threads: Option<usize>,
    /// Parquet read batch size
    pub batch_size: Option<usize>,
    /// Whether to draw progress bars
    pub show_progress: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            continuity_threshold_days: 1,
            frequent_flyer_min_readmissions: 3,
            rapid_readmission_days: 30,
            bucket_count: 4,
            rank_order: RankOrder::Descending,
            prior_admission_window_days: 365,
            num_threads: None,
            batch_size: None,
            show_progress: true,
        }
    }
}

impl AnalyticsConfig {
    /// Create a configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; absent keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the episode continuity threshold
    #[must_use]
    pub fn with_continuity_threshold(mut self, days: i64) -> Self {
        self.continuity_threshold_days = days;
        self
    }

    /// Set the frequent-flyer readmission threshold
    #[must_use]
    pub fn with_frequent_flyer_min_readmissions(mut self, count: usize) -> Self {
        self.frequent_flyer_min_readmissions = count;
        self
    }

    /// Set the rapid readmission window
    #[must_use]
    pub fn with_rapid_readmission_days(mut self, days: i64) -> Self {
        self.rapid_readmission_days = days;
        self
    }

    /// Set the number of buckets used for bucket ranking
    #[must_use]
    pub fn with_bucket_count(mut self, buckets: usize) -> Self {
        self.bucket_count = buckets;
        self
    }

    /// Set the rank direction
    #[must_use]
    pub fn with_rank_order(mut self, order: RankOrder) -> Self {
        self.rank_order = order;
        self
    }

    /// Set the prior-admission look-back window
    #[must_use]
    pub fn with_prior_admission_window(mut self, days: i64) -> Self {
        self.prior_admission_window_days = days;
        self
    }

    /// Set the number of worker threads
    #[must_use]
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Enable or disable progress bars
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Worker threads to use, falling back to the CPU count
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get)
    }

    /// Batch size to use: configured, then environment, then default
    #[must_use]
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size
            .or_else(|| {
                std::env::var(BATCH_SIZE_ENV)
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
            })
            .unwrap_or(DEFAULT_BATCH_SIZE)
    }

    /// Check that all values are in range
    pub fn validate(&self) -> Result<()> {
        if self.bucket_count == 0 {
            return Err(AnalyticsError::invalid_parameter(
                "bucket_count must be at least 1",
            ));
        }
        if self.continuity_threshold_days < 0 {
            return Err(AnalyticsError::invalid_parameter(format!(
                "continuity_threshold_days must be non-negative, got {}",
                self.continuity_threshold_days
            )));
        }
        if self.rapid_readmission_days < 0 {
            return Err(AnalyticsError::invalid_parameter(format!(
                "rapid_readmission_days must be non-negative, got {}",
                self.rapid_readmission_days
            )));
        }
        if self.prior_admission_window_days <= 0 {
            return Err(AnalyticsError::invalid_parameter(format!(
                "prior_admission_window_days must be positive, got {}",
                self.prior_admission_window_days
            )));
        }
        if self.num_threads == Some(0) {
            return Err(AnalyticsError::invalid_parameter(
                "num_threads must be at least 1",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for AnalyticsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analytics Configuration:")?;
        writeln!(
            f,
            "  Continuity Threshold: {} days",
            self.continuity_threshold_days
        )?;
        writeln!(
            f,
            "  Frequent Flyer Minimum Readmissions: {}",
            self.frequent_flyer_min_readmissions
        )?;
        writeln!(
            f,
            "  Rapid Readmission Window: {} days",
            self.rapid_readmission_days
        )?;
        writeln!(f, "  Buckets: {}", self.bucket_count)?;
        writeln!(f, "  Rank Order: {:?}", self.rank_order)?;
        writeln!(
            f,
            "  Prior Admission Window: {} days",
            self.prior_admission_window_days
        )?;
        writeln!(f, "  Threads: {}", self.effective_threads())?;
        Ok(())
    }
}

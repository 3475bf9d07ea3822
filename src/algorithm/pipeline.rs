//! Batch analytics pipeline
//!
//! Ingestion, sequencing, interval measurement, tiering, episode segmentation
//! and composite scoring run independently per patient on a worker pool.
//! Population-level statistics are computed from the merged result once
//! every patient is done.

use std::time::Instant;

use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::risk::{CompositeRiskRow, RiskSnapshot, RiskTier, composite_score};
use crate::algorithm::statistics::{
    Dimension, DistributionTable, FlagAgreement, FrequentFlyer, Measure, Ranking, TierShare,
    aggregate, frequent_flyers, rank, readmission_flag_agreement, tier_distribution,
};
use crate::algorithm::timeline::{
    Episode, Interval, IntervalStatus, PatientSequence, SequenceStep, assign_episode_ids,
    compute_intervals, length_of_stay, sequence_encounters, summarize_episodes,
};
use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, Result};
use crate::export::ExportRow;
use crate::models::encounter::{RawEncounter, ingest};
use crate::models::quality::{DataQualityIssue, DataQualityReport};
use crate::models::record::EncounterRecord;
use crate::utils::logging::{create_main_progress_bar, finish_progress_bar, log_stage_complete, log_warning};

/// Everything derived from one patient's sequence
#[derive(Debug, Clone)]
pub struct PatientOutcome {
    /// One record per encounter, in sequence order
    pub records: Vec<EncounterRecord>,
    /// One summary per episode of care
    pub episodes: Vec<Episode>,
    /// Composite score of the latest encounter
    pub composite: Option<CompositeRiskRow>,
    /// Anomalies found in the sequence
    pub quality: DataQualityReport,
}

/// Count and log the anomalies of one step
fn audit(step: &SequenceStep<'_>, interval: &Interval, quality: &mut DataQualityReport) {
    let current = step.current;

    if interval.has_invalid_stay() {
        quality.record(DataQualityIssue::InvalidInterval);
        log::warn!(
            "Patient {}: discharge {:?} precedes admission {}",
            current.patient_key,
            current.discharge_time,
            current.admission_time
        );
    }

    if interval.is_overlapping() {
        quality.record(DataQualityIssue::OverlappingEncounters);
        log::warn!(
            "Patient {}: admission {} precedes previous discharge {:?}",
            current.patient_key,
            current.admission_time,
            interval.predecessor_discharge_time
        );
    }

    match interval.status {
        IntervalStatus::FirstVisit => quality.first_visits += 1,
        IntervalStatus::Indeterminate => {
            quality.record(DataQualityIssue::IndeterminateGap);
            log::warn!(
                "Patient {}: previous encounter has no discharge date, gap before {} is indeterminate",
                current.patient_key,
                current.admission_time
            );
        }
        IntervalStatus::Measured => {}
    }

    if let Some(previous) = step.predecessor {
        if previous.admission_time == current.admission_time {
            quality.same_day_admissions += 1;
            log::debug!(
                "Patient {}: two admissions on {}, kept in input order",
                current.patient_key,
                current.admission_time
            );
        }
    }
}

/// Run every per-patient stage over one sequence
#[must_use]
pub fn process_sequence(sequence: &PatientSequence, config: &AnalyticsConfig) -> PatientOutcome {
    let window = config.prior_admission_window_days;
    let intervals = compute_intervals(sequence);
    let episode_ids = assign_episode_ids(
        intervals.iter().map(|interval| interval.gap_days),
        config.continuity_threshold_days,
    );

    let mut quality = DataQualityReport::default();
    let mut records = Vec::with_capacity(sequence.len());

    for ((step, interval), &episode_id) in sequence.steps().zip(&intervals).zip(&episode_ids) {
        audit(&step, interval, &mut quality);
        let current = step.current;

        records.push(EncounterRecord {
            patient_key: current.patient_key.clone(),
            position: u32::try_from(step.position).unwrap_or(u32::MAX),
            admission_time: current.admission_time,
            discharge_time: current.discharge_time,
            predecessor_discharge_time: interval.predecessor_discharge_time,
            gap_days: interval.gap_days,
            interval_status: interval.status,
            risk_tier: RiskTier::classify(interval.gap_days),
            episode_id,
            length_of_stay: interval.length_of_stay,
            diagnosis: current.diagnosis.clone(),
            bill_amount: current.bill_amount,
            readmitted_flag: current.readmitted_flag,
            prior_admissions: u32::try_from(sequence.prior_admissions(step.position, window))
                .unwrap_or(u32::MAX),
        });
    }

    let composite = sequence.latest().map(|latest| {
        let prior = sequence.prior_admissions(sequence.len() - 1, window);
        let snapshot = RiskSnapshot::from_encounter(latest, length_of_stay(latest), prior);
        let risk = composite_score(&snapshot);
        CompositeRiskRow {
            patient_key: sequence.patient_key.clone(),
            score: risk.score,
            label: risk.label,
            lace_total: risk.lace.total(),
        }
    });

    PatientOutcome {
        records,
        episodes: summarize_episodes(sequence, &intervals, &episode_ids),
        composite,
        quality,
    }
}

/// Rank of one encounter's measure across the population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEncounter {
    /// Patient identifier
    pub patient_key: String,
    /// Position within the patient's sequence
    pub position: u32,
    /// Measured value
    pub value: f64,
    /// Competition rank
    pub competition_rank: u64,
    /// Dense rank
    pub dense_rank: u64,
    /// 1-based bucket
    pub bucket: u64,
    /// Cumulative distribution
    pub cume_dist: f64,
}

impl ExportRow for RankedEncounter {
    fn schema_samples() -> Vec<Self> {
        vec![Self {
            patient_key: String::new(),
            position: 0,
            value: 0.0,
            competition_rank: 1,
            dense_rank: 1,
            bucket: 1,
            cume_dist: 1.0,
        }]
    }
}

/// Result of an analytics batch
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Encounter stream ordered by patient and position
    pub records: Vec<EncounterRecord>,
    /// Episodes ordered by patient and episode id
    pub episodes: Vec<Episode>,
    /// Composite risk per patient, ordered by patient
    pub composite: Vec<CompositeRiskRow>,
    /// Anomaly counts
    pub quality: DataQualityReport,
    /// Configuration the batch ran with
    pub config: AnalyticsConfig,
}

impl Analysis {
    /// Summarize a measure per group of a dimension
    #[must_use]
    pub fn distribution(&self, dimension: Dimension, measure: Measure) -> DistributionTable {
        aggregate(&self.records, dimension, measure)
    }

    /// Patients meeting the configured frequent-flyer threshold
    #[must_use]
    pub fn frequent_flyers(&self) -> Vec<FrequentFlyer> {
        frequent_flyers(
            &self.records,
            self.config.frequent_flyer_min_readmissions,
            self.config.rapid_readmission_days,
        )
    }

    /// Encounter counts per risk tier
    #[must_use]
    pub fn tier_distribution(&self) -> Vec<TierShare> {
        tier_distribution(&self.records)
    }

    /// Agreement of the supplied readmission flag with the derived indicator
    #[must_use]
    pub fn flag_agreement(&self) -> FlagAgreement {
        readmission_flag_agreement(&self.records)
    }

    /// Rank a measure over every encounter
    ///
    /// Indices in the ranking refer to [`Analysis::records`].
    pub fn rank(&self, measure: Measure) -> Result<Ranking> {
        let values: Vec<Option<f64>> = self.records.iter().map(|r| measure.of(r)).collect();
        rank(&values, self.config.bucket_count, self.config.rank_order)
    }

    /// Ranked rows of a measure, in rank order
    pub fn ranked_encounters(&self, measure: Measure) -> Result<Vec<RankedEncounter>> {
        let ranking = self.rank(measure)?;
        Ok(ranking
            .ranked
            .iter()
            .map(|ranked| {
                let record = &self.records[ranked.index];
                RankedEncounter {
                    patient_key: record.patient_key.clone(),
                    position: record.position,
                    value: ranked.value,
                    competition_rank: ranked.competition_rank as u64,
                    dense_rank: ranked.dense_rank as u64,
                    bucket: ranked.bucket as u64,
                    cume_dist: ranked.cume_dist,
                }
            })
            .collect())
    }
}

/// Run the analytics batch over raw records
///
/// # Errors
/// Returns an error if the configuration is invalid or the worker pool
/// cannot be started. Data-quality problems never fail the batch; they are
/// counted in [`Analysis::quality`].
pub fn analyze<I>(raw: I, config: &AnalyticsConfig) -> Result<Analysis>
where
    I: IntoIterator<Item = RawEncounter>,
{
    config.validate()?;
    let start = Instant::now();

    let ingestion = ingest(raw);
    let mut quality = DataQualityReport::from_ingestion(&ingestion);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.effective_threads())
        .build()
        .map_err(|e| AnalyticsError::Other(format!("Failed to build worker pool: {e}")))?;
    log::info!(
        "Processing {} encounters with {} threads",
        quality.accepted,
        pool.current_num_threads()
    );

    let outcomes: Vec<PatientOutcome> = pool.install(|| {
        let sequences = sequence_encounters(ingestion.encounters);
        let pb = create_main_progress_bar(
            sequences.len() as u64,
            Some("Processing patients"),
            config.show_progress,
        );
        let outcomes: Vec<PatientOutcome> = sequences
            .par_iter()
            .progress_with(pb.clone())
            .map(|sequence| process_sequence(sequence, config))
            .collect();
        finish_progress_bar(&pb, Some("Patients processed"));
        outcomes
    });

    let mut records = Vec::with_capacity(quality.accepted);
    let mut episodes = Vec::new();
    let mut composite = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        quality.merge(&outcome.quality);
        records.extend(outcome.records);
        episodes.extend(outcome.episodes);
        composite.extend(outcome.composite);
    }

    log_stage_complete("Per-patient analytics", records.len(), start.elapsed());
    if quality.has_anomalies() {
        log_warning(&format!("Batch completed with anomalies\n{quality}"), None);
    }

    Ok(Analysis {
        records,
        episodes,
        composite,
        quality,
        config: config.clone(),
    })
}

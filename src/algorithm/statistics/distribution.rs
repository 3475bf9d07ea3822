//! Distribution aggregator
//!
//! Groups encounter records by a dimension and summarizes a numeric measure
//! per group. Rows whose measure is missing are left out of the statistics
//! and counted once at table level. The percentage denominator is the total
//! measured count across all groups, computed once before any group is
//! summarized.

use std::fmt;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ranking::median;
use crate::algorithm::risk::RiskTier;
use crate::algorithm::risk::tier::MODERATE_MAX_DAYS;
use crate::export::ExportRow;
use crate::models::record::EncounterRecord;

/// Label used for records without a diagnosis
pub const UNKNOWN_DIAGNOSIS: &str = "UNKNOWN";

/// Grouping dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Group by gap risk tier
    RiskTier,
    /// Group by diagnosis label
    Diagnosis,
    /// Group by patient
    Patient,
}

/// Numeric measure to summarize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Readmission gap in days
    Gap,
    /// Billed amount
    Cost,
    /// Length of stay in days
    LengthOfStay,
}

impl Measure {
    /// Value of this measure for a record
    #[must_use]
    pub fn of(self, record: &EncounterRecord) -> Option<f64> {
        match self {
            Self::Gap => record.gap_days.map(|days| days as f64),
            Self::Cost => record.bill_amount,
            Self::LengthOfStay => record.length_of_stay.map(|days| days as f64),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RiskTier => write!(f, "risk tier"),
            Self::Diagnosis => write!(f, "diagnosis"),
            Self::Patient => write!(f, "patient"),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gap => write!(f, "gap"),
            Self::Cost => write!(f, "cost"),
            Self::LengthOfStay => write!(f, "length of stay"),
        }
    }
}

/// Group key, ordered the way groups are reported
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum GroupKey {
    Tier(RiskTier),
    Diagnosis(Option<String>),
    Patient(String),
}

impl GroupKey {
    fn of(record: &EncounterRecord, dimension: Dimension) -> Self {
        match dimension {
            Dimension::RiskTier => Self::Tier(record.risk_tier),
            Dimension::Diagnosis => Self::Diagnosis(record.diagnosis.clone()),
            Dimension::Patient => Self::Patient(record.patient_key.clone()),
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Tier(tier) => tier.label().to_string(),
            Self::Diagnosis(diagnosis) => diagnosis
                .clone()
                .unwrap_or_else(|| UNKNOWN_DIAGNOSIS.to_string()),
            Self::Patient(key) => key.clone(),
        }
    }
}

/// Summary of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortStat {
    /// Group label
    pub group_key: String,
    /// Number of measured rows in the group
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Interpolated median
    pub median: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Share of all measured rows, in percent
    pub pct_of_total: f64,
}

impl CohortStat {
    /// Summarize a group's values; `None` for an empty group
    fn from_values(group_key: String, mut values: Vec<f64>, total: usize) -> Option<Self> {
        values.sort_by(f64::total_cmp);
        let count = values.len();
        let median = median(&values)?;
        Some(Self {
            group_key,
            count,
            mean: values.iter().sum::<f64>() / count as f64,
            median,
            min: values[0],
            max: values[count - 1],
            pct_of_total: percentage(count, total),
        })
    }
}

impl ExportRow for CohortStat {
    fn schema_samples() -> Vec<Self> {
        vec![Self {
            group_key: String::new(),
            count: 0,
            mean: 0.0,
            median: 0.0,
            min: 0.0,
            max: 0.0,
            pct_of_total: 0.0,
        }]
    }
}

/// Per-group summary of one measure along one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionTable {
    /// Grouping dimension
    pub dimension: Dimension,
    /// Summarized measure
    pub measure: Measure,
    /// One row per group with at least one measured value
    pub rows: Vec<CohortStat>,
    /// Measured rows across all groups
    pub measured_total: usize,
    /// Rows whose measure was missing
    pub indeterminate: usize,
}

impl DistributionTable {
    /// Row for a group label
    #[must_use]
    pub fn row(&self, group_key: &str) -> Option<&CohortStat> {
        self.rows.iter().find(|row| row.group_key == group_key)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Summarize `measure` per group of `dimension`
#[must_use]
pub fn aggregate(
    records: &[EncounterRecord],
    dimension: Dimension,
    measure: Measure,
) -> DistributionTable {
    let mut groups: FxHashMap<GroupKey, Vec<f64>> = FxHashMap::default();
    let mut indeterminate = 0;

    for record in records {
        match measure.of(record) {
            Some(value) if value.is_finite() => groups
                .entry(GroupKey::of(record, dimension))
                .or_default()
                .push(value),
            _ => indeterminate += 1,
        }
    }

    let measured_total = groups.values().map(Vec::len).sum();

    let mut keyed: Vec<(GroupKey, CohortStat)> = groups
        .into_par_iter()
        .filter_map(|(key, values)| {
            let stat = CohortStat::from_values(key.label(), values, measured_total)?;
            Some((key, stat))
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    DistributionTable {
        dimension,
        measure,
        rows: keyed.into_iter().map(|(_, stat)| stat).collect(),
        measured_total,
        indeterminate,
    }
}

/// Encounter count and share of one risk tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierShare {
    /// Risk tier
    pub risk_tier: RiskTier,
    /// Encounters in the tier
    pub count: usize,
    /// Share of all encounters, in percent
    pub pct_of_total: f64,
}

/// Encounter counts for every risk tier, zero counts included
#[must_use]
pub fn tier_distribution(records: &[EncounterRecord]) -> Vec<TierShare> {
    let mut counts: FxHashMap<RiskTier, usize> = FxHashMap::default();
    for record in records {
        *counts.entry(record.risk_tier).or_insert(0) += 1;
    }

    RiskTier::ALL
        .iter()
        .map(|&risk_tier| {
            let count = counts.get(&risk_tier).copied().unwrap_or(0);
            TierShare {
                risk_tier,
                count,
                pct_of_total: percentage(count, records.len()),
            }
        })
        .collect()
}

/// Agreement between the supplied readmission flag and the derived one
///
/// The derived indicator of an encounter is true when the same patient's
/// next encounter starts within 30 days of its discharge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagAgreement {
    /// Both flags set
    pub both: usize,
    /// Neither flag set
    pub neither: usize,
    /// Only the supplied flag set
    pub flag_only: usize,
    /// Only the derived indicator set
    pub derived_only: usize,
}

impl FlagAgreement {
    /// Encounters compared
    #[must_use]
    pub const fn total(&self) -> usize {
        self.both + self.neither + self.flag_only + self.derived_only
    }

    /// Fraction of encounters on which both indicators agree
    #[must_use]
    pub fn agreement_rate(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some((self.both + self.neither) as f64 / total as f64),
        }
    }
}

/// Compare each encounter's supplied flag with the derived 30-day indicator
///
/// `records` must be ordered by patient and position, as produced by the
/// pipeline.
#[must_use]
pub fn readmission_flag_agreement(records: &[EncounterRecord]) -> FlagAgreement {
    let mut agreement = FlagAgreement::default();

    for patient in records.chunk_by(|a, b| a.patient_key == b.patient_key) {
        let followers = patient.iter().skip(1).map(Some).chain(std::iter::once(None));
        for (record, next) in patient.iter().zip(followers) {
            let derived = next
                .and_then(|next| next.gap_days)
                .is_some_and(|gap| gap <= MODERATE_MAX_DAYS);
            match (record.readmitted_flag, derived) {
                (true, true) => agreement.both += 1,
                (false, false) => agreement.neither += 1,
                (true, false) => agreement.flag_only += 1,
                (false, true) => agreement.derived_only += 1,
            }
        }
    }

    agreement
}

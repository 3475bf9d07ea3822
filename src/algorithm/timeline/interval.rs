//! Gap and length-of-stay calculation
//!
//! Date arithmetic here is null-aware at every step: a missing date yields a
//! missing result, never a placeholder number.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PatientSequence;
use crate::models::encounter::Encounter;

/// How the gap to the predecessor was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalStatus {
    /// No predecessor: the patient's first recorded visit
    FirstVisit,
    /// Gap measured from the predecessor's discharge
    Measured,
    /// Predecessor exists but its discharge date is unknown
    Indeterminate,
}

/// The interval between an encounter and its predecessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// 0-based position within the patient's sequence
    pub position: usize,
    /// Discharge date of the predecessor, if any
    pub predecessor_discharge_time: Option<NaiveDate>,
    /// Days from predecessor discharge to this admission; negative on overlap
    pub gap_days: Option<i64>,
    /// How the gap was resolved
    pub status: IntervalStatus,
    /// Days from admission to discharge; negative when discharge precedes admission
    pub length_of_stay: Option<i64>,
}

impl Interval {
    /// Admission before the predecessor's discharge
    #[must_use]
    pub fn is_overlapping(&self) -> bool {
        self.gap_days.is_some_and(|gap| gap < 0)
    }

    /// Discharge recorded before admission
    #[must_use]
    pub fn has_invalid_stay(&self) -> bool {
        self.length_of_stay.is_some_and(|los| los < 0)
    }
}

/// Whole days from `earlier` to `later`, or `None` when `earlier` is unknown
#[must_use]
pub fn days_between(later: NaiveDate, earlier: Option<NaiveDate>) -> Option<i64> {
    earlier.map(|earlier| (later - earlier).num_days())
}

/// Length of stay in whole days
#[must_use]
pub fn length_of_stay(encounter: &Encounter) -> Option<i64> {
    encounter
        .discharge_time
        .map(|discharge| (discharge - encounter.admission_time).num_days())
}

/// Resolve the gap between an encounter and its predecessor
#[must_use]
pub fn resolve_gap(
    current: &Encounter,
    predecessor: Option<&Encounter>,
) -> (Option<i64>, IntervalStatus) {
    match predecessor {
        None => (None, IntervalStatus::FirstVisit),
        Some(previous) => match days_between(current.admission_time, previous.discharge_time) {
            Some(gap) => (Some(gap), IntervalStatus::Measured),
            None => (None, IntervalStatus::Indeterminate),
        },
    }
}

/// Compute the interval for every encounter of a patient, in sequence order
#[must_use]
pub fn compute_intervals(sequence: &PatientSequence) -> Vec<Interval> {
    sequence
        .steps()
        .map(|step| {
            let (gap_days, status) = resolve_gap(step.current, step.predecessor);
            Interval {
                position: step.position,
                predecessor_discharge_time: step.predecessor.and_then(|p| p.discharge_time),
                gap_days,
                status,
                length_of_stay: length_of_stay(step.current),
            }
        })
        .collect()
}

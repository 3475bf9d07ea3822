//! Data-quality taxonomy and counters
//!
//! None of these conditions stop a batch. Structural problems are filtered at
//! ingestion and counted; anomalies inside a patient's timeline flow through
//! the pipeline as ordinary values and are tallied here for auditing.

use std::fmt;

use serde::Serialize;

use crate::models::encounter::{Ingestion, RejectionReason};

/// Kinds of data-quality conditions found in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataQualityIssue {
    /// Record lacks a patient key or admission date; excluded from sequencing
    MissingKey(RejectionReason),
    /// Discharge precedes admission on the same encounter
    InvalidInterval,
    /// Admission precedes the predecessor's discharge (negative gap)
    OverlappingEncounters,
    /// Predecessor exists but its discharge date is unknown
    IndeterminateGap,
}

impl DataQualityIssue {
    /// Short human readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::MissingKey(RejectionReason::MissingPatientKey) => "missing patient key",
            Self::MissingKey(RejectionReason::MissingAdmissionTime) => "missing admission date",
            Self::InvalidInterval => "discharge before admission",
            Self::OverlappingEncounters => "overlapping encounters",
            Self::IndeterminateGap => "predecessor discharge unknown",
        }
    }
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Anomaly counts for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQualityReport {
    /// Records supplied by the record store
    pub total_input: usize,
    /// Records accepted for sequencing
    pub accepted: usize,
    /// Records rejected for a missing patient key
    pub rejected_missing_patient_key: usize,
    /// Records rejected for a missing admission date
    pub rejected_missing_admission_time: usize,
    /// Encounters with discharge before admission
    pub invalid_intervals: usize,
    /// Encounters admitted before their predecessor's discharge
    pub overlapping_encounters: usize,
    /// Encounters whose predecessor has no discharge date
    pub indeterminate_gaps: usize,
    /// First recorded visit of a patient
    pub first_visits: usize,
    /// Encounters sharing an admission date with their predecessor
    pub same_day_admissions: usize,
    /// Comorbidity scores clamped into range at ingestion
    pub clamped_comorbidity: usize,
    /// Negative bill amounts dropped at ingestion
    pub negative_bill_amounts: usize,
}

impl DataQualityReport {
    /// Start a report from the ingestion outcome
    #[must_use]
    pub fn from_ingestion(ingestion: &Ingestion) -> Self {
        let mut report = Self {
            total_input: ingestion.total_input(),
            accepted: ingestion.encounters.len(),
            clamped_comorbidity: ingestion.clamped_comorbidity,
            negative_bill_amounts: ingestion.negative_bill_amounts,
            ..Self::default()
        };
        for rejection in &ingestion.rejected {
            report.record(DataQualityIssue::MissingKey(rejection.reason));
        }
        report
    }

    /// Count one occurrence of an issue
    pub fn record(&mut self, issue: DataQualityIssue) {
        match issue {
            DataQualityIssue::MissingKey(RejectionReason::MissingPatientKey) => {
                self.rejected_missing_patient_key += 1;
            }
            DataQualityIssue::MissingKey(RejectionReason::MissingAdmissionTime) => {
                self.rejected_missing_admission_time += 1;
            }
            DataQualityIssue::InvalidInterval => self.invalid_intervals += 1,
            DataQualityIssue::OverlappingEncounters => self.overlapping_encounters += 1,
            DataQualityIssue::IndeterminateGap => self.indeterminate_gaps += 1,
        }
    }

    /// Occurrences of an issue
    #[must_use]
    pub fn count(&self, issue: DataQualityIssue) -> usize {
        match issue {
            DataQualityIssue::MissingKey(RejectionReason::MissingPatientKey) => {
                self.rejected_missing_patient_key
            }
            DataQualityIssue::MissingKey(RejectionReason::MissingAdmissionTime) => {
                self.rejected_missing_admission_time
            }
            DataQualityIssue::InvalidInterval => self.invalid_intervals,
            DataQualityIssue::OverlappingEncounters => self.overlapping_encounters,
            DataQualityIssue::IndeterminateGap => self.indeterminate_gaps,
        }
    }

    /// Fold the per-patient counters of another report into this one
    pub fn merge(&mut self, other: &Self) {
        self.invalid_intervals += other.invalid_intervals;
        self.overlapping_encounters += other.overlapping_encounters;
        self.indeterminate_gaps += other.indeterminate_gaps;
        self.first_visits += other.first_visits;
        self.same_day_admissions += other.same_day_admissions;
    }

    /// Total rejected records
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.rejected_missing_patient_key + self.rejected_missing_admission_time
    }

    /// Whether any anomaly was seen
    #[must_use]
    pub fn has_anomalies(&self) -> bool {
        self.rejected() > 0
            || self.invalid_intervals > 0
            || self.overlapping_encounters > 0
            || self.indeterminate_gaps > 0
            || self.clamped_comorbidity > 0
            || self.negative_bill_amounts > 0
    }
}

impl fmt::Display for DataQualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data Quality Summary:")?;
        writeln!(f, "  Input Records: {}", self.total_input)?;
        writeln!(f, "  Accepted: {}", self.accepted)?;
        writeln!(
            f,
            "  Rejected: {} ({} without patient key, {} without admission date)",
            self.rejected(),
            self.rejected_missing_patient_key,
            self.rejected_missing_admission_time
        )?;
        writeln!(f, "  First Visits: {}", self.first_visits)?;
        writeln!(f, "  Invalid Intervals: {}", self.invalid_intervals)?;
        writeln!(f, "  Overlapping Encounters: {}", self.overlapping_encounters)?;
        writeln!(f, "  Indeterminate Gaps: {}", self.indeterminate_gaps)?;
        writeln!(f, "  Same-Day Admissions: {}", self.same_day_admissions)?;
        writeln!(f, "  Clamped Comorbidity Scores: {}", self.clamped_comorbidity)?;
        writeln!(f, "  Negative Bill Amounts: {}", self.negative_bill_amounts)?;
        Ok(())
    }
}

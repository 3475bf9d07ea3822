//! Per-encounter analytic output
//!
//! One [`EncounterRecord`] is produced for every accepted encounter. It is
//! the row type of the encounter stream and the input of every population
//! level aggregate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::algorithm::risk::RiskTier;
use crate::algorithm::timeline::IntervalStatus;
use crate::export::ExportRow;

/// An encounter with its timeline position, gap, tier and episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRecord {
    /// Patient identifier
    pub patient_key: String,
    /// 0-based position within the patient's sequence
    pub position: u32,
    /// Admission date
    pub admission_time: NaiveDate,
    /// Discharge date
    pub discharge_time: Option<NaiveDate>,
    /// Discharge date of the preceding encounter
    pub predecessor_discharge_time: Option<NaiveDate>,
    /// Days from the predecessor's discharge to this admission
    pub gap_days: Option<i64>,
    /// How the gap was resolved
    pub interval_status: IntervalStatus,
    /// Risk tier of the gap
    pub risk_tier: RiskTier,
    /// Episode of care within the patient
    pub episode_id: u32,
    /// Days from admission to discharge
    pub length_of_stay: Option<i64>,
    /// Diagnosis label
    pub diagnosis: Option<String>,
    /// Billed amount
    pub bill_amount: Option<f64>,
    /// Externally supplied 30-day readmission indicator
    pub readmitted_flag: bool,
    /// Admissions in the look-back window before this one
    pub prior_admissions: u32,
}

impl EncounterRecord {
    /// Whether this encounter follows an earlier one of the same patient
    #[must_use]
    pub const fn is_readmission(&self) -> bool {
        self.position > 0
    }
}

impl ExportRow for EncounterRecord {
    fn schema_samples() -> Vec<Self> {
        let admitted = NaiveDate::default();
        let measured = Self {
            patient_key: String::new(),
            position: 1,
            admission_time: admitted,
            discharge_time: Some(admitted),
            predecessor_discharge_time: Some(admitted),
            gap_days: Some(0),
            interval_status: IntervalStatus::Measured,
            risk_tier: RiskTier::Critical,
            episode_id: 0,
            length_of_stay: Some(0),
            diagnosis: Some(String::new()),
            bill_amount: Some(0.0),
            readmitted_flag: false,
            prior_admissions: 1,
        };
        let first_visit = Self {
            position: 0,
            discharge_time: None,
            predecessor_discharge_time: None,
            gap_days: None,
            interval_status: IntervalStatus::FirstVisit,
            risk_tier: RiskTier::FirstVisit,
            length_of_stay: None,
            diagnosis: None,
            bill_amount: None,
            prior_admissions: 0,
            ..measured.clone()
        };
        vec![measured, first_visit]
    }
}

#[cfg(test)]
impl EncounterRecord {
    /// A record with the given gap and every other field empty
    pub(crate) fn fixture(patient_key: &str, position: u32, gap_days: Option<i64>) -> Self {
        let status = match (position, gap_days) {
            (0, _) => IntervalStatus::FirstVisit,
            (_, Some(_)) => IntervalStatus::Measured,
            (_, None) => IntervalStatus::Indeterminate,
        };
        Self {
            patient_key: patient_key.to_string(),
            position,
            admission_time: NaiveDate::default(),
            discharge_time: None,
            predecessor_discharge_time: None,
            gap_days,
            interval_status: status,
            risk_tier: RiskTier::classify(gap_days),
            episode_id: 0,
            length_of_stay: None,
            diagnosis: None,
            bill_amount: None,
            readmitted_flag: false,
            prior_admissions: 0,
        }
    }

    pub(crate) fn with_bill(mut self, bill_amount: f64) -> Self {
        self.bill_amount = Some(bill_amount);
        self
    }

    pub(crate) fn with_diagnosis(mut self, diagnosis: &str) -> Self {
        self.diagnosis = Some(diagnosis.to_string());
        self
    }
}

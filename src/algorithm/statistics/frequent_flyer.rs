//! Frequent-flyer cohort detection

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::export::ExportRow;
use crate::models::record::EncounterRecord;

/// A patient with many readmissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequentFlyer {
    /// Patient identifier
    pub patient_key: String,
    /// Encounters after the first visit
    pub total_readmissions: usize,
    /// Mean of the measured gaps
    pub avg_gap: Option<f64>,
    /// Shortest measured gap
    pub min_gap: Option<i64>,
    /// Longest measured gap
    pub max_gap: Option<i64>,
    /// Share of measured gaps within the rapid-readmission window, in percent
    pub pct_rapid_readmit: Option<f64>,
    /// Sum of the known bill amounts over all the patient's encounters
    pub total_bill: f64,
}

impl ExportRow for FrequentFlyer {
    fn schema_samples() -> Vec<Self> {
        let measured = Self {
            patient_key: String::new(),
            total_readmissions: 0,
            avg_gap: Some(0.0),
            min_gap: Some(0),
            max_gap: Some(0),
            pct_rapid_readmit: Some(0.0),
            total_bill: 0.0,
        };
        let unmeasured = Self {
            avg_gap: None,
            min_gap: None,
            max_gap: None,
            pct_rapid_readmit: None,
            ..measured.clone()
        };
        vec![measured, unmeasured]
    }
}

fn summarize(
    patient: &[EncounterRecord],
    min_readmissions: usize,
    rapid_days: i64,
) -> Option<FrequentFlyer> {
    let first = patient.first()?;
    let total_readmissions = patient.iter().filter(|r| r.is_readmission()).count();
    if total_readmissions < min_readmissions {
        return None;
    }

    let gaps: Vec<i64> = patient
        .iter()
        .filter(|r| r.is_readmission())
        .filter_map(|r| r.gap_days)
        .collect();
    let rapid = gaps.iter().filter(|&&gap| gap <= rapid_days).count();
    let measured = gaps.len() as f64;

    Some(FrequentFlyer {
        patient_key: first.patient_key.clone(),
        total_readmissions,
        avg_gap: (!gaps.is_empty()).then(|| gaps.iter().sum::<i64>() as f64 / measured),
        min_gap: gaps.iter().min().copied(),
        max_gap: gaps.iter().max().copied(),
        pct_rapid_readmit: (!gaps.is_empty()).then(|| rapid as f64 * 100.0 / measured),
        total_bill: patient.iter().filter_map(|r| r.bill_amount).sum(),
    })
}

/// Patients with at least `min_readmissions` readmissions
///
/// `records` must be ordered by patient and position. The result is sorted
/// by readmission count, largest first, then by patient key.
#[must_use]
pub fn frequent_flyers(
    records: &[EncounterRecord],
    min_readmissions: usize,
    rapid_days: i64,
) -> Vec<FrequentFlyer> {
    let patients: Vec<&[EncounterRecord]> = records
        .chunk_by(|a, b| a.patient_key == b.patient_key)
        .collect();

    let mut flyers: Vec<FrequentFlyer> = patients
        .into_par_iter()
        .filter_map(|patient| summarize(patient, min_readmissions, rapid_days))
        .collect();

    flyers.sort_by(|a, b| {
        b.total_readmissions
            .cmp(&a.total_readmissions)
            .then_with(|| a.patient_key.cmp(&b.patient_key))
    });
    flyers
}

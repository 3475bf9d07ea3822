//! Composite clinical risk score
//!
//! A fixed weighted sum of independent clinical factors, mapped to a coarse
//! label. This is a deterministic formula, not a fitted model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lace::{LaceInput, LaceScore, lace_score};
use crate::export::ExportRow;
use crate::models::encounter::{AdmissionType, Encounter};

/// Age above which the age factor applies
pub const ELDERLY_AGE: u32 = 70;
/// Diagnosis text that triggers the heart-failure factor
pub const HEART_FAILURE: &str = "Heart Failure";

/// Weight of the age factor
pub const AGE_WEIGHT: u32 = 20;
/// Weight of the heart-failure factor
pub const HEART_FAILURE_WEIGHT: u32 = 30;
/// Weight of an emergency admission
pub const EMERGENCY_WEIGHT: u32 = 10;
/// Weight of a high LACE index
pub const LACE_WEIGHT: u32 = 40;
/// Points per comorbidity score unit
pub const COMORBIDITY_WEIGHT: u32 = 5;

/// Lowest score labelled high
pub const HIGH_SCORE: u32 = 80;
/// Lowest score labelled medium
pub const MEDIUM_SCORE: u32 = 50;

/// Coarse risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    /// Score below 50
    Low,
    /// Score in [50, 80)
    Medium,
    /// Score of 80 or more
    High,
}

impl RiskLabel {
    /// Label a score; each band includes its lower bound
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        if score >= HIGH_SCORE {
            Self::High
        } else if score >= MEDIUM_SCORE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Get a descriptive name for this label
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// The clinical facts the score is computed from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RiskSnapshot {
    /// Age in years
    pub age: Option<u32>,
    /// Diagnosis label
    pub diagnosis: Option<String>,
    /// Admission type
    pub admission_type: Option<AdmissionType>,
    /// Comorbidity score
    pub comorbidity_score: Option<u8>,
    /// Length of stay in days
    pub length_of_stay: Option<i64>,
    /// Admissions in the look-back window before this one
    pub prior_admissions: usize,
}

impl RiskSnapshot {
    /// Snapshot of an encounter with its derived timeline facts
    #[must_use]
    pub fn from_encounter(
        encounter: &Encounter,
        length_of_stay: Option<i64>,
        prior_admissions: usize,
    ) -> Self {
        Self {
            age: encounter.age,
            diagnosis: encounter.diagnosis.clone(),
            admission_type: encounter.admission_type,
            comorbidity_score: encounter.comorbidity_score,
            length_of_stay,
            prior_admissions,
        }
    }

    /// LACE index for this snapshot
    #[must_use]
    pub fn lace(&self) -> LaceScore {
        lace_score(&LaceInput {
            length_of_stay: self.length_of_stay,
            emergency: self.admission_type == Some(AdmissionType::Emergency),
            comorbidity_score: self.comorbidity_score,
            prior_admissions: self.prior_admissions,
        })
    }
}

/// Composite score with its label and the LACE index it used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeRisk {
    /// Weighted score, at least 0
    pub score: u32,
    /// Label derived from the score
    pub label: RiskLabel,
    /// LACE index of the snapshot
    pub lace: LaceScore,
}

/// Output row of the composite risk table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeRiskRow {
    /// Patient identifier
    pub patient_key: String,
    /// Weighted score
    pub score: u32,
    /// Label derived from the score
    pub label: RiskLabel,
    /// LACE total used by the score
    pub lace_total: u8,
}

impl ExportRow for CompositeRiskRow {
    fn schema_samples() -> Vec<Self> {
        vec![Self {
            patient_key: String::new(),
            score: 0,
            label: RiskLabel::Low,
            lace_total: 0,
        }]
    }
}

/// Score a snapshot
#[must_use]
pub fn composite_score(snapshot: &RiskSnapshot) -> CompositeRisk {
    let lace = snapshot.lace();
    let mut score = 0;

    if snapshot.age.is_some_and(|age| age > ELDERLY_AGE) {
        score += AGE_WEIGHT;
    }
    if snapshot
        .diagnosis
        .as_deref()
        .is_some_and(|diagnosis| diagnosis.contains(HEART_FAILURE))
    {
        score += HEART_FAILURE_WEIGHT;
    }
    if snapshot.admission_type == Some(AdmissionType::Emergency) {
        score += EMERGENCY_WEIGHT;
    }
    if lace.is_high_risk() {
        score += LACE_WEIGHT;
    }
    score += COMORBIDITY_WEIGHT * u32::from(snapshot.comorbidity_score.unwrap_or(0));

    CompositeRisk {
        score,
        label: RiskLabel::from_score(score),
        lace,
    }
}

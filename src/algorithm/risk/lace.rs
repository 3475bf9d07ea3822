//! LACE readmission index
//!
//! Length of stay, Acuity of admission, Comorbidity and prior (E)ncounters,
//! each mapped to capped points. The weights are fixed.

use serde::{Deserialize, Serialize};

/// Points for an emergency (acute) admission
pub const ACUITY_POINTS: u8 = 3;
/// Cap on comorbidity points
pub const MAX_COMORBIDITY_POINTS: u8 = 5;
/// Cap on prior-admission points
pub const MAX_PRIOR_ADMISSION_POINTS: u8 = 4;
/// Scores above this are high risk
pub const HIGH_RISK_THRESHOLD: u8 = 10;

/// Inputs to the LACE index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaceInput {
    /// Length of stay in days
    pub length_of_stay: Option<i64>,
    /// Emergency admission
    pub emergency: bool,
    /// Comorbidity score
    pub comorbidity_score: Option<u8>,
    /// Admissions in the look-back window
    pub prior_admissions: usize,
}

/// LACE components and total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaceScore {
    /// Length-of-stay points (0-7)
    pub length: u8,
    /// Acuity points (0 or 3)
    pub acuity: u8,
    /// Comorbidity points (0-5)
    pub comorbidity: u8,
    /// Prior-admission points (0-4)
    pub encounters: u8,
}

impl LaceScore {
    /// Sum of all components (0-19)
    #[must_use]
    pub const fn total(&self) -> u8 {
        self.length + self.acuity + self.comorbidity + self.encounters
    }

    /// Whether the total exceeds the high-risk threshold
    #[must_use]
    pub const fn is_high_risk(&self) -> bool {
        self.total() > HIGH_RISK_THRESHOLD
    }
}

/// Points for length of stay; unknown or negative stays score 0
#[must_use]
pub const fn length_points(length_of_stay: Option<i64>) -> u8 {
    match length_of_stay {
        Some(days) if days >= 14 => 7,
        Some(days) if days >= 7 => 5,
        Some(days) if days >= 4 => 4,
        Some(3) => 3,
        Some(2) => 2,
        Some(1) => 1,
        _ => 0,
    }
}

/// Points for the comorbidity score
#[must_use]
pub const fn comorbidity_points(comorbidity_score: Option<u8>) -> u8 {
    match comorbidity_score {
        Some(score) if score >= 4 => MAX_COMORBIDITY_POINTS,
        Some(score) => score,
        None => 0,
    }
}

/// Points for prior admissions
#[must_use]
pub fn encounter_points(prior_admissions: usize) -> u8 {
    // Capped at 4 so the narrowing is lossless
    prior_admissions.min(usize::from(MAX_PRIOR_ADMISSION_POINTS)) as u8
}

/// Compute the LACE index
#[must_use]
pub fn lace_score(input: &LaceInput) -> LaceScore {
    LaceScore {
        length: length_points(input.length_of_stay),
        acuity: if input.emergency { ACUITY_POINTS } else { 0 },
        comorbidity: comorbidity_points(input.comorbidity_score),
        encounters: encounter_points(input.prior_admissions),
    }
}

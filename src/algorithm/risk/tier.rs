//! Readmission risk tiers
//!
//! Maps the gap between a discharge and the next admission to an ordinal
//! tier. Each bound is inclusive on the upper end of its bucket.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest gap classified as critical
pub const CRITICAL_MAX_DAYS: i64 = 7;
/// Largest gap classified as high
pub const HIGH_MAX_DAYS: i64 = 14;
/// Largest gap classified as moderate
pub const MODERATE_MAX_DAYS: i64 = 30;

/// Risk tier of a readmission gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    /// No predecessor to measure from
    FirstVisit,
    /// Gap of at most 7 days (negative gaps from overlapping stays included)
    Critical,
    /// Gap of 8 to 14 days
    High,
    /// Gap of 15 to 30 days
    Moderate,
    /// Gap beyond 30 days
    Low,
}

impl RiskTier {
    /// All tiers in ordinal order
    pub const ALL: [Self; 5] = [
        Self::FirstVisit,
        Self::Critical,
        Self::High,
        Self::Moderate,
        Self::Low,
    ];

    /// Classify a gap in days; `None` means there is nothing to measure from
    #[must_use]
    pub const fn classify(gap_days: Option<i64>) -> Self {
        match gap_days {
            None => Self::FirstVisit,
            Some(gap) if gap <= CRITICAL_MAX_DAYS => Self::Critical,
            Some(gap) if gap <= HIGH_MAX_DAYS => Self::High,
            Some(gap) if gap <= MODERATE_MAX_DAYS => Self::Moderate,
            Some(_) => Self::Low,
        }
    }

    /// Stable label used in reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstVisit => "FIRST_VISIT",
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Moderate => "MODERATE",
            Self::Low => "LOW",
        }
    }

    /// Whether the tier falls inside the 30-day readmission window
    #[must_use]
    pub const fn is_within_30_days(self) -> bool {
        matches!(self, Self::Critical | Self::High | Self::Moderate)
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

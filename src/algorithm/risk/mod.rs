//! Risk classification and scoring
//!
//! Gap-based risk tiers, the LACE readmission index and the composite
//! clinical risk score built on top of it.

pub mod composite;
pub mod lace;
pub mod tier;

pub use composite::{CompositeRisk, CompositeRiskRow, RiskLabel, RiskSnapshot, composite_score};
pub use lace::{LaceInput, LaceScore, lace_score};
pub use tier::RiskTier;

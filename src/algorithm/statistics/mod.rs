//! Population-level statistics
//!
//! These operate on the complete set of encounter records and therefore run
//! only after every patient has been processed.

pub mod distribution;
pub mod frequent_flyer;
pub mod ranking;

pub use distribution::{
    CohortStat, Dimension, DistributionTable, FlagAgreement, Measure, TierShare, aggregate,
    readmission_flag_agreement, tier_distribution,
};
pub use frequent_flyer::{FrequentFlyer, frequent_flyers};
pub use ranking::{RankOrder, RankedValue, Ranking, median, percentile_cont, rank};

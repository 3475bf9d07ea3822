//! Analytic algorithms
//!
//! Per-patient timeline construction, risk classification and scoring, and
//! the population statistics computed over the merged result.

pub mod pipeline;
pub mod risk;
pub mod statistics;
pub mod timeline;

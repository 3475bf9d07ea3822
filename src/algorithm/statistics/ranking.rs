//! Percentile and rank engine
//!
//! Ranks a numeric measure across the whole population in two passes: the
//! measured values are sorted once into a single total order, then ranks,
//! buckets and cumulative distribution are assigned by position. Ties are
//! runs of equal values in that order.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Direction of ordinal and bucket ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    /// Smallest value gets rank 1
    Ascending,
    /// Largest value gets rank 1
    #[default]
    Descending,
}

impl fmt::Display for RankOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

/// Rank information for one measured value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedValue {
    /// Index of the value in the input slice
    pub index: usize,
    /// The measured value
    pub value: f64,
    /// Ties share a rank; the next rank skips by the tie count
    pub competition_rank: usize,
    /// Ties share a rank; the next rank is one higher
    pub dense_rank: usize,
    /// 1-based bucket, earlier buckets hold the extra members
    pub bucket: usize,
    /// Fraction of the population with a value less than or equal to this one
    pub cume_dist: f64,
}

/// Result of ranking a measure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    /// Ranked values in rank order
    pub ranked: Vec<RankedValue>,
    /// Input indices whose value was missing or not finite
    pub unranked: Vec<usize>,
}

impl Ranking {
    /// Rank information for the input at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RankedValue> {
        self.ranked.iter().find(|ranked| ranked.index == index)
    }

    /// Number of ranked values
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// Whether nothing was ranked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Split of a population into near-equal buckets
#[derive(Debug, Clone, Copy)]
struct BucketLayout {
    size: usize,
    extra: usize,
}

impl BucketLayout {
    const fn new(population: usize, buckets: usize) -> Self {
        Self {
            size: population / buckets,
            extra: population % buckets,
        }
    }

    /// 1-based bucket of the member at `position` in rank order
    const fn bucket_of(self, position: usize) -> usize {
        let large = self.extra * (self.size + 1);
        if position < large {
            position / (self.size + 1) + 1
        } else {
            self.extra + (position - large) / self.size + 1
        }
    }
}

/// Rank a measure across the population
///
/// Missing and non-finite values are excluded and reported in
/// [`Ranking::unranked`]. Competition rank, dense rank and bucket follow
/// `order`; the cumulative distribution is always taken over ascending
/// values.
///
/// # Errors
/// Returns an error if `buckets` is zero.
pub fn rank(values: &[Option<f64>], buckets: usize, order: RankOrder) -> Result<Ranking> {
    if buckets == 0 {
        return Err(AnalyticsError::invalid_parameter(
            "bucket count must be at least 1",
        ));
    }

    let mut unranked = Vec::new();
    let mut sorted: Vec<(usize, f64)> = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        match value {
            // -0.0 and 0.0 tie
            Some(value) if value.is_finite() => sorted.push((index, *value + 0.0)),
            _ => unranked.push(index),
        }
    }
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let population = sorted.len();
    let grouped = sorted.into_iter().chunk_by(|(_, value)| value.to_bits());

    let mut seen = 0;
    let mut runs: Vec<(f64, Vec<(usize, f64)>)> = grouped
        .into_iter()
        .map(|(_, run)| {
            let run: Vec<_> = run.collect();
            seen += run.len();
            (seen as f64 / population as f64, run)
        })
        .collect();

    if order == RankOrder::Descending {
        runs.reverse();
    }

    let layout = BucketLayout::new(population, buckets);
    let mut ranked = Vec::with_capacity(population);
    for (dense, (cume_dist, run)) in runs.into_iter().enumerate() {
        let competition_rank = ranked.len() + 1;
        for (index, value) in run {
            let bucket = layout.bucket_of(ranked.len());
            ranked.push(RankedValue {
                index,
                value,
                competition_rank,
                dense_rank: dense + 1,
                bucket,
                cume_dist,
            });
        }
    }

    Ok(Ranking { ranked, unranked })
}

/// Continuous percentile of ascending sorted values
///
/// Interpolates linearly between the two nearest order statistics.
/// `fraction` is clamped to [0, 1].
#[must_use]
pub fn percentile_cont(sorted: &[f64], fraction: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = fraction.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Median of ascending sorted values
#[must_use]
pub fn median(sorted: &[f64]) -> Option<f64> {
    percentile_cont(sorted, 0.5)
}

//! Episode-of-care segmentation (gaps and islands)
//!
//! Consecutive encounters of a patient belong to the same episode while the
//! gap between them stays within the continuity threshold. The first visit
//! always opens episode 0; every gap beyond the threshold, and every gap that
//! cannot be measured, opens the next one.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{Interval, PatientSequence};
use crate::export::ExportRow;

/// A maximal run of encounters treated as one period of care
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Patient identifier
    pub patient_key: String,
    /// Episode number within the patient, starting at 0
    pub episode_id: u32,
    /// First admission of the episode
    pub start: NaiveDate,
    /// Latest known discharge of the episode
    pub end: Option<NaiveDate>,
    /// Number of encounters merged into the episode
    pub encounter_count: usize,
    /// Sum of the known lengths of stay
    pub total_length_of_stay: i64,
}

impl ExportRow for Episode {
    fn schema_samples() -> Vec<Self> {
        let closed = Self {
            patient_key: String::new(),
            episode_id: 0,
            start: NaiveDate::default(),
            end: Some(NaiveDate::default()),
            encounter_count: 1,
            total_length_of_stay: 0,
        };
        let open = Self {
            end: None,
            ..closed.clone()
        };
        vec![closed, open]
    }
}

/// Assign an episode id to each gap of an ordered sequence
///
/// `gaps` holds one entry per encounter in admission order; the first entry
/// is ignored since a first visit always opens episode 0.
#[must_use]
pub fn assign_episode_ids<I>(gaps: I, continuity_threshold: i64) -> Vec<u32>
where
    I: IntoIterator<Item = Option<i64>>,
{
    let mut episode_id = 0u32;
    gaps.into_iter()
        .enumerate()
        .map(|(position, gap)| {
            if position > 0 && !gap.is_some_and(|days| days <= continuity_threshold) {
                episode_id += 1;
            }
            episode_id
        })
        .collect()
}

/// Collapse a patient's encounters into one [`Episode`] per island
#[must_use]
pub fn summarize_episodes(
    sequence: &PatientSequence,
    intervals: &[Interval],
    episode_ids: &[u32],
) -> Vec<Episode> {
    let islands = sequence
        .encounters
        .iter()
        .zip(intervals)
        .zip(episode_ids)
        .chunk_by(|((_, _), id)| **id);

    islands
        .into_iter()
        .filter_map(|(episode_id, members)| {
            let members: Vec<_> = members.collect();
            let ((first, _), _) = members.first()?;
            Some(Episode {
                patient_key: sequence.patient_key.clone(),
                episode_id,
                start: first.admission_time,
                end: members.iter().filter_map(|((e, _), _)| e.discharge_time).max(),
                encounter_count: members.len(),
                total_length_of_stay: members
                    .iter()
                    .filter_map(|((_, interval), _)| interval.length_of_stay)
                    .sum(),
            })
        })
        .collect()
}

//! Per-patient chronological timelines
//!
//! This module groups validated encounters by patient and orders each group
//! by admission date. Everything downstream (gap measurement, episode
//! segmentation, prior-admission counts) walks these ordered sequences with
//! an explicit predecessor rather than any implicit cursor.

pub mod episode;
pub mod interval;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::models::encounter::Encounter;

pub use episode::{Episode, assign_episode_ids, summarize_episodes};
pub use interval::{Interval, IntervalStatus, compute_intervals, days_between, length_of_stay};

/// One patient's encounters in admission order
#[derive(Debug, Clone, PartialEq)]
pub struct PatientSequence {
    /// Patient identifier shared by every encounter in the sequence
    pub patient_key: String,
    /// Encounters ordered by admission date, ties kept in input order
    pub encounters: Vec<Encounter>,
}

/// An encounter together with its place in the patient's sequence
#[derive(Debug, Clone, Copy)]
pub struct SequenceStep<'a> {
    /// 0-based position within the patient's sequence
    pub position: usize,
    /// The encounter at this position
    pub current: &'a Encounter,
    /// The immediately preceding encounter of the same patient
    pub predecessor: Option<&'a Encounter>,
}

impl PatientSequence {
    /// Create a sequence from one patient's encounters, ordering them
    #[must_use]
    pub fn new(patient_key: String, mut encounters: Vec<Encounter>) -> Self {
        encounters.sort_by_key(|e| (e.admission_time, e.source_index));
        Self {
            patient_key,
            encounters,
        }
    }

    /// Number of encounters
    #[must_use]
    pub fn len(&self) -> usize {
        self.encounters.len()
    }

    /// Whether the sequence has no encounters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encounters.is_empty()
    }

    /// Walk the sequence together with each encounter's predecessor
    pub fn steps(&self) -> impl Iterator<Item = SequenceStep<'_>> {
        let previous = std::iter::once(None).chain(self.encounters.iter().map(Some));
        self.encounters
            .iter()
            .zip(previous)
            .enumerate()
            .map(|(position, (current, predecessor))| SequenceStep {
                position,
                current,
                predecessor,
            })
    }

    /// The most recent encounter
    #[must_use]
    pub fn latest(&self) -> Option<&Encounter> {
        self.encounters.last()
    }

    /// Count earlier admissions that fall within `window_days` before the
    /// admission at `position`
    #[must_use]
    pub fn prior_admissions(&self, position: usize, window_days: i64) -> usize {
        let Some(current) = self.encounters.get(position) else {
            return 0;
        };

        self.encounters[..position]
            .iter()
            .rev()
            .take_while(|earlier| {
                (current.admission_time - earlier.admission_time).num_days() <= window_days
            })
            .count()
    }
}

/// Group encounters by patient and order each group chronologically
///
/// Ties on admission date keep their input order. Sequences are returned
/// sorted by patient key so the output is deterministic.
#[must_use]
pub fn sequence_encounters(encounters: Vec<Encounter>) -> Vec<PatientSequence> {
    let mut groups: FxHashMap<String, SmallVec<[usize; 8]>> = FxHashMap::default();
    for (idx, encounter) in encounters.iter().enumerate() {
        groups
            .entry(encounter.patient_key.clone())
            .or_default()
            .push(idx);
    }

    let mut slots: Vec<Option<Encounter>> = encounters.into_iter().map(Some).collect();

    let mut sequences: Vec<PatientSequence> = groups
        .into_iter()
        .map(|(patient_key, indices)| {
            let members = indices
                .into_iter()
                .filter_map(|idx| slots[idx].take())
                .collect();
            (patient_key, members)
        })
        .collect::<Vec<(String, Vec<Encounter>)>>()
        .into_par_iter()
        .map(|(patient_key, members)| PatientSequence::new(patient_key, members))
        .collect();

    sequences.sort_unstable_by(|a, b| a.patient_key.cmp(&b.patient_key));
    sequences
}

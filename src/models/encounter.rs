//! Encounter entity model
//!
//! An encounter is one hospitalization, from admission to discharge. Records
//! arrive from the record store as [`RawEncounter`]s in which every field may
//! be missing; [`ingest`] filters out records that cannot be placed on a
//! patient timeline and turns the rest into validated [`Encounter`]s.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound of the comorbidity score
pub const MAX_COMORBIDITY_SCORE: u8 = 24;

/// How the patient was admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionType {
    /// Unplanned admission through the emergency department
    Emergency,
    /// Unplanned but not emergent
    Urgent,
    /// Planned admission
    Elective,
    /// Anything else
    Other,
}

impl From<&str> for AdmissionType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "emergency" | "emergent" | "acute" | "er" => Self::Emergency,
            "urgent" => Self::Urgent,
            "elective" | "planned" => Self::Elective,
            _ => Self::Other,
        }
    }
}

/// An encounter as supplied by the record store, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEncounter {
    /// Opaque patient identifier
    pub patient_key: Option<String>,
    /// Admission date
    pub admission_time: Option<NaiveDate>,
    /// Discharge date
    pub discharge_time: Option<NaiveDate>,
    /// Diagnosis label
    pub diagnosis: Option<String>,
    /// Comorbidity score, expected in [0, 24]
    pub comorbidity_score: Option<i64>,
    /// Billed amount
    pub bill_amount: Option<f64>,
    /// Externally supplied 30-day readmission indicator
    pub readmitted_flag: bool,
    /// Age at admission in years
    pub age: Option<u32>,
    /// Admission type
    pub admission_type: Option<AdmissionType>,
}

impl RawEncounter {
    /// Create a raw encounter with the timeline fields set
    #[must_use]
    pub fn new(
        patient_key: impl Into<String>,
        admission_time: NaiveDate,
        discharge_time: Option<NaiveDate>,
    ) -> Self {
        Self {
            patient_key: Some(patient_key.into()),
            admission_time: Some(admission_time),
            discharge_time,
            ..Self::default()
        }
    }

    /// Set the diagnosis label
    #[must_use]
    pub fn with_diagnosis(mut self, diagnosis: impl Into<String>) -> Self {
        self.diagnosis = Some(diagnosis.into());
        self
    }

    /// Set the comorbidity score
    #[must_use]
    pub fn with_comorbidity(mut self, score: i64) -> Self {
        self.comorbidity_score = Some(score);
        self
    }

    /// Set the billed amount
    #[must_use]
    pub fn with_bill_amount(mut self, amount: f64) -> Self {
        self.bill_amount = Some(amount);
        self
    }

    /// Set the age at admission
    #[must_use]
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Set the admission type
    #[must_use]
    pub fn with_admission_type(mut self, admission_type: AdmissionType) -> Self {
        self.admission_type = Some(admission_type);
        self
    }

    /// Set the externally supplied readmission flag
    #[must_use]
    pub fn with_readmitted_flag(mut self, flag: bool) -> Self {
        self.readmitted_flag = flag;
        self
    }
}

/// A validated encounter that can be placed on a patient timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    /// 0-based position of the record in the input, used as tie-break
    pub source_index: usize,
    /// Opaque patient identifier
    pub patient_key: String,
    /// Admission date
    pub admission_time: NaiveDate,
    /// Discharge date, if known
    pub discharge_time: Option<NaiveDate>,
    /// Diagnosis label
    pub diagnosis: Option<String>,
    /// Comorbidity score in [0, 24]
    pub comorbidity_score: Option<u8>,
    /// Billed amount (non-negative)
    pub bill_amount: Option<f64>,
    /// Externally supplied 30-day readmission indicator
    pub readmitted_flag: bool,
    /// Age at admission in years
    pub age: Option<u32>,
    /// Admission type
    pub admission_type: Option<AdmissionType>,
}

impl Encounter {
    /// Whether this was an emergency admission
    #[must_use]
    pub fn is_emergency(&self) -> bool {
        self.admission_type == Some(AdmissionType::Emergency)
    }
}

/// Why a raw record was excluded from sequencing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// No (or blank) patient key
    MissingPatientKey,
    /// No admission date
    MissingAdmissionTime,
}

/// A raw record excluded at the ingestion boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// 0-based position of the record in the input
    pub source_index: usize,
    /// Reason for exclusion
    pub reason: RejectionReason,
}

/// Outcome of ingesting a batch of raw records
#[derive(Debug, Clone, Default)]
pub struct Ingestion {
    /// Records accepted for sequencing, in input order
    pub encounters: Vec<Encounter>,
    /// Records excluded for missing keys
    pub rejected: Vec<Rejection>,
    /// Accepted records whose comorbidity score was clamped into range
    pub clamped_comorbidity: usize,
    /// Accepted records whose negative bill amount was dropped
    pub negative_bill_amounts: usize,
}

impl Ingestion {
    /// Count rejections with a given reason
    #[must_use]
    pub fn rejected_for(&self, reason: RejectionReason) -> usize {
        self.rejected.iter().filter(|r| r.reason == reason).count()
    }

    /// Total number of records seen
    #[must_use]
    pub fn total_input(&self) -> usize {
        self.encounters.len() + self.rejected.len()
    }
}

/// Validate raw records into encounters
///
/// Records without a patient key or admission date are counted as rejected,
/// never silently dropped. Out-of-range optional values are repaired (and
/// counted) rather than rejected.
pub fn ingest<I>(records: I) -> Ingestion
where
    I: IntoIterator<Item = RawEncounter>,
{
    let mut ingestion = Ingestion::default();

    for (source_index, raw) in records.into_iter().enumerate() {
        let patient_key = match raw.patient_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                ingestion.rejected.push(Rejection {
                    source_index,
                    reason: RejectionReason::MissingPatientKey,
                });
                continue;
            }
        };

        let Some(admission_time) = raw.admission_time else {
            ingestion.rejected.push(Rejection {
                source_index,
                reason: RejectionReason::MissingAdmissionTime,
            });
            continue;
        };

        let comorbidity_score = raw.comorbidity_score.map(|score| {
            let clamped = score.clamp(0, i64::from(MAX_COMORBIDITY_SCORE));
            if clamped != score {
                log::warn!(
                    "Comorbidity score {score} for patient {patient_key} is outside [0, {MAX_COMORBIDITY_SCORE}], clamped to {clamped}"
                );
                ingestion.clamped_comorbidity += 1;
            }
            // Clamped into [0, 24] above
            clamped as u8
        });

        let bill_amount = match raw.bill_amount {
            Some(amount) if amount < 0.0 => {
                log::warn!("Negative bill amount {amount} for patient {patient_key} treated as missing");
                ingestion.negative_bill_amounts += 1;
                None
            }
            other => other.map(|amount| amount + 0.0),
        };

        ingestion.encounters.push(Encounter {
            source_index,
            patient_key,
            admission_time,
            discharge_time: raw.discharge_time,
            diagnosis: raw.diagnosis,
            comorbidity_score,
            bill_amount,
            readmitted_flag: raw.readmitted_flag,
            age: raw.age,
            admission_type: raw.admission_type,
        });
    }

    if !ingestion.rejected.is_empty() {
        log::warn!(
            "Rejected {} of {} records: {} without patient key, {} without admission date",
            ingestion.rejected.len(),
            ingestion.total_input(),
            ingestion.rejected_for(RejectionReason::MissingPatientKey),
            ingestion.rejected_for(RejectionReason::MissingAdmissionTime),
        );
    }

    ingestion
}

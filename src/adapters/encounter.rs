//! Encounter record store adapter
//!
//! Reads hospitalization records from Arrow batches. Only the patient key and
//! admission date columns are required; any other column may be absent, in
//! which case the field is missing on every record.

use std::path::Path;

use arrow::array::ArrayRef;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use rayon::prelude::*;

use super::RecordStoreAdapter;
use crate::error::{AnalyticsError, Result};
use crate::models::encounter::{AdmissionType, RawEncounter};
use crate::utils::arrow_utils::{
    arrow_array_to_bool, arrow_array_to_date, arrow_array_to_f64, arrow_array_to_i64,
    arrow_array_to_string, optional_column, required_column,
};
use crate::utils::{load_parquet_files_parallel, read_parquet};

/// Column names of the encounter table
pub mod columns {
    /// Patient identifier
    pub const PATIENT_KEY: &str = "patient_key";
    /// Admission date
    pub const ADMISSION_TIME: &str = "admission_time";
    /// Discharge date
    pub const DISCHARGE_TIME: &str = "discharge_time";
    /// Diagnosis label
    pub const DIAGNOSIS: &str = "diagnosis";
    /// Comorbidity score
    pub const COMORBIDITY_SCORE: &str = "comorbidity_score";
    /// Billed amount
    pub const BILL_AMOUNT: &str = "bill_amount";
    /// Supplied readmission flag
    pub const READMITTED_FLAG: &str = "readmitted_flag";
    /// Age at admission
    pub const AGE: &str = "age";
    /// Admission type
    pub const ADMISSION_TYPE: &str = "admission_type";
}

fn is_string(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Utf8 | DataType::LargeUtf8)
}

fn is_date(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Date32 | DataType::Date64) || is_string(data_type)
}

fn is_numeric(data_type: &DataType) -> bool {
    data_type.is_integer() || data_type.is_floating()
}

fn is_flag(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Boolean) || data_type.is_integer()
}

/// Check the physical type of a column
fn check_type<'a>(
    column: &'a ArrayRef,
    name: &str,
    accepts: fn(&DataType) -> bool,
    expected: &str,
) -> Result<&'a ArrayRef> {
    if accepts(column.data_type()) {
        Ok(column)
    } else {
        Err(AnalyticsError::invalid_data_type(name, expected))
    }
}

fn optional<'a>(
    batch: &'a RecordBatch,
    name: &str,
    accepts: fn(&DataType) -> bool,
    expected: &str,
) -> Result<Option<&'a ArrayRef>> {
    optional_column(batch, name)
        .map(|column| check_type(column, name, accepts, expected))
        .transpose()
}

/// Adapter from encounter record batches to [`RawEncounter`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct EncounterAdapter;

impl RecordStoreAdapter<RawEncounter> for EncounterAdapter {
    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<RawEncounter>> {
        use columns::*;

        let patient_key = check_type(
            required_column(batch, PATIENT_KEY)?,
            PATIENT_KEY,
            is_string,
            "string",
        )?;
        let admission_time = check_type(
            required_column(batch, ADMISSION_TIME)?,
            ADMISSION_TIME,
            is_date,
            "date or ISO date string",
        )?;
        let discharge_time = optional(batch, DISCHARGE_TIME, is_date, "date or ISO date string")?;
        let diagnosis = optional(batch, DIAGNOSIS, is_string, "string")?;
        let comorbidity = optional(batch, COMORBIDITY_SCORE, is_numeric, "number")?;
        let bill_amount = optional(batch, BILL_AMOUNT, is_numeric, "number")?;
        let readmitted = optional(batch, READMITTED_FLAG, is_flag, "boolean")?;
        let age = optional(batch, AGE, is_numeric, "number")?;
        let admission_type = optional(batch, ADMISSION_TYPE, is_string, "string")?;

        let encounters = (0..batch.num_rows())
            .map(|row| RawEncounter {
                patient_key: arrow_array_to_string(patient_key, row),
                admission_time: arrow_array_to_date(admission_time, row),
                discharge_time: discharge_time.and_then(|c| arrow_array_to_date(c, row)),
                diagnosis: diagnosis.and_then(|c| arrow_array_to_string(c, row)),
                comorbidity_score: comorbidity.and_then(|c| arrow_array_to_i64(c, row)),
                bill_amount: bill_amount.and_then(|c| arrow_array_to_f64(c, row)),
                readmitted_flag: readmitted
                    .and_then(|c| arrow_array_to_bool(c, row))
                    .unwrap_or(false),
                age: age
                    .and_then(|c| arrow_array_to_i64(c, row))
                    .and_then(|v| u32::try_from(v).ok()),
                admission_type: admission_type
                    .and_then(|c| arrow_array_to_string(c, row))
                    .map(|s| AdmissionType::from(s.as_str())),
            })
            .collect();

        Ok(encounters)
    }
}

/// Decode one record batch of encounters
///
/// # Errors
/// Returns an error if a required column is missing or any column has an
/// unusable type
pub fn decode_encounters(batch: &RecordBatch) -> Result<Vec<RawEncounter>> {
    EncounterAdapter::from_record_batch(batch)
}

fn decode_all(batches: &[RecordBatch]) -> Result<Vec<RawEncounter>> {
    let decoded: Vec<Vec<RawEncounter>> = batches
        .par_iter()
        .map(decode_encounters)
        .collect::<Result<_>>()?;
    Ok(decoded.into_iter().flatten().collect())
}

/// Read the encounters of one Parquet file
///
/// # Errors
/// Returns an error if the file cannot be read or decoded
pub fn read_encounters(path: &Path, batch_size: usize) -> Result<Vec<RawEncounter>> {
    decode_all(&read_parquet(path, batch_size)?)
}

/// Read the encounters of every Parquet file in a directory
///
/// # Errors
/// Returns an error if the directory or any file cannot be read or decoded
pub fn load_encounters_from_dir(dir: &Path, batch_size: usize) -> Result<Vec<RawEncounter>> {
    decode_all(&load_parquet_files_parallel(dir, batch_size)?)
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Date32Builder, Float64Builder, Int64Builder, StringBuilder,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use readmit::export::write_parquet;
use readmit::models::AdmissionType;
use readmit::{AnalyticsConfig, RawEncounter, Result};

/// Build a date, panicking on invalid input
#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

/// Configuration without progress bars and with a small pool
#[must_use]
pub fn quiet_config() -> AnalyticsConfig {
    AnalyticsConfig::default()
        .with_progress(false)
        .with_num_threads(2)
}

/// A fresh directory under the system temp dir
#[must_use]
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("readmit-test-{name}-{}", std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("clear temp dir");
    }
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// Patient P of the three-visit scenario, plus a few other patients
#[must_use]
pub fn sample_encounters() -> Vec<RawEncounter> {
    vec![
        RawEncounter::new("P", date(2024, 2, 18), Some(date(2024, 2, 25)))
            .with_diagnosis("Pneumonia")
            .with_bill_amount(5200.0),
        RawEncounter::new("P", date(2024, 1, 15), Some(date(2024, 1, 24)))
            .with_diagnosis("Pneumonia")
            .with_bill_amount(8100.0),
        RawEncounter::new("P", date(2024, 3, 20), Some(date(2024, 3, 29)))
            .with_diagnosis("Sepsis")
            .with_bill_amount(12000.0),
        RawEncounter::new("Q", date(2024, 1, 1), Some(date(2024, 1, 3)))
            .with_diagnosis("Heart Failure")
            .with_bill_amount(3000.0)
            .with_readmitted_flag(true),
        RawEncounter::new("Q", date(2024, 1, 10), Some(date(2024, 1, 12)))
            .with_diagnosis("Heart Failure")
            .with_bill_amount(4000.0),
        RawEncounter::new("Q", date(2024, 1, 13), Some(date(2024, 1, 20)))
            .with_diagnosis("Heart Failure")
            .with_bill_amount(4000.0),
        RawEncounter::new("Q", date(2024, 2, 5), Some(date(2024, 2, 19)))
            .with_diagnosis("Heart Failure")
            .with_bill_amount(9000.0)
            .with_age(85)
            .with_comorbidity(8)
            .with_admission_type(AdmissionType::Emergency),
        RawEncounter::new("R", date(2024, 6, 1), Some(date(2024, 6, 4))),
    ]
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch");
    i32::try_from((date - epoch).num_days()).expect("date in Date32 range")
}

/// Encode raw encounters as a record store batch
pub fn encounter_batch(encounters: &[RawEncounter]) -> Result<RecordBatch> {
    let mut patient_key = StringBuilder::new();
    let mut admission_time = Date32Builder::new();
    let mut discharge_time = Date32Builder::new();
    let mut diagnosis = StringBuilder::new();
    let mut comorbidity_score = Int64Builder::new();
    let mut bill_amount = Float64Builder::new();
    let mut readmitted_flag = BooleanBuilder::new();
    let mut age = Int64Builder::new();
    let mut admission_type = StringBuilder::new();

    for encounter in encounters {
        patient_key.append_option(encounter.patient_key.as_deref());
        admission_time.append_option(encounter.admission_time.map(days_since_epoch));
        discharge_time.append_option(encounter.discharge_time.map(days_since_epoch));
        diagnosis.append_option(encounter.diagnosis.as_deref());
        comorbidity_score.append_option(encounter.comorbidity_score);
        bill_amount.append_option(encounter.bill_amount);
        readmitted_flag.append_value(encounter.readmitted_flag);
        age.append_option(encounter.age.map(i64::from));
        admission_type.append_option(encounter.admission_type.map(|t| match t {
            AdmissionType::Emergency => "Emergency",
            AdmissionType::Urgent => "Urgent",
            AdmissionType::Elective => "Elective",
            AdmissionType::Other => "Other",
        }));
    }

    let schema = Schema::new(vec![
        Field::new("patient_key", DataType::Utf8, true),
        Field::new("admission_time", DataType::Date32, true),
        Field::new("discharge_time", DataType::Date32, true),
        Field::new("diagnosis", DataType::Utf8, true),
        Field::new("comorbidity_score", DataType::Int64, true),
        Field::new("bill_amount", DataType::Float64, true),
        Field::new("readmitted_flag", DataType::Boolean, false),
        Field::new("age", DataType::Int64, true),
        Field::new("admission_type", DataType::Utf8, true),
    ]);

    let columns: Vec<ArrayRef> = vec![
        Arc::new(patient_key.finish()),
        Arc::new(admission_time.finish()),
        Arc::new(discharge_time.finish()),
        Arc::new(diagnosis.finish()),
        Arc::new(comorbidity_score.finish()),
        Arc::new(bill_amount.finish()),
        Arc::new(readmitted_flag.finish()),
        Arc::new(age.finish()),
        Arc::new(admission_type.finish()),
    ];

    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

/// Write raw encounters to `<dir>/<name>.parquet`
pub fn write_encounter_file(dir: &Path, name: &str, encounters: &[RawEncounter]) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.parquet"));
    write_parquet(&path, &encounter_batch(encounters)?)?;
    Ok(path)
}

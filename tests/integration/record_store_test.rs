use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use readmit::export::write_table;
use readmit::utils::read_parquet;
use readmit::{
    AnalyticsError, EncounterRecord, Result, analyze, decode_encounters, load_encounters_async,
    load_encounters_from_dir, read_encounters,
};

use crate::utils::{
    encounter_batch, quiet_config, sample_encounters, temp_dir, write_encounter_file,
};

const BATCH_SIZE: usize = 4;

#[test]
fn test_read_single_file() -> Result<()> {
    let dir = temp_dir("single-file");
    let path = write_encounter_file(&dir, "encounters", &sample_encounters())?;

    let encounters = read_encounters(&path, BATCH_SIZE)?;
    assert_eq!(encounters, sample_encounters());
    Ok(())
}

#[test]
fn test_read_directory_in_file_order() -> Result<()> {
    let dir = temp_dir("directory");
    let sample = sample_encounters();
    let (first, second) = sample.split_at(3);
    write_encounter_file(&dir, "b_second", second)?;
    write_encounter_file(&dir, "a_first", first)?;

    let encounters = load_encounters_from_dir(&dir, BATCH_SIZE)?;
    assert_eq!(encounters, sample);
    Ok(())
}

#[tokio::test]
async fn test_async_loader_matches_sync_reader() -> Result<()> {
    let dir = temp_dir("async-loader");
    let sample = sample_encounters();
    let (first, second) = sample.split_at(5);
    write_encounter_file(&dir, "part_0", first)?;
    let single = write_encounter_file(&dir, "part_1", second)?;

    let from_dir = load_encounters_async(&dir, BATCH_SIZE).await?;
    assert_eq!(from_dir, load_encounters_from_dir(&dir, BATCH_SIZE)?);
    assert_eq!(from_dir, sample);

    let from_file = load_encounters_async(&single, BATCH_SIZE).await?;
    assert_eq!(from_file, second.to_vec());
    Ok(())
}

#[tokio::test]
async fn test_loaded_encounters_analyze_like_in_memory() -> Result<()> {
    let dir = temp_dir("analyze-loaded");
    write_encounter_file(&dir, "encounters", &sample_encounters())?;

    let loaded = load_encounters_async(&dir, BATCH_SIZE).await?;
    let from_store = analyze(loaded, &quiet_config())?;
    let in_memory = analyze(sample_encounters(), &quiet_config())?;

    assert_eq!(from_store.records, in_memory.records);
    assert_eq!(from_store.composite, in_memory.composite);
    Ok(())
}

#[test]
fn test_optional_columns_may_be_absent() -> Result<()> {
    let schema = Schema::new(vec![
        Field::new("patient_key", DataType::Utf8, true),
        Field::new("admission_time", DataType::Utf8, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec![Some("A"), None])),
        Arc::new(StringArray::from(vec![Some("2024-01-15"), Some("2024-01-16")])),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;

    let encounters = decode_encounters(&batch)?;
    assert_eq!(encounters.len(), 2);
    assert_eq!(encounters[0].patient_key.as_deref(), Some("A"));
    assert!(encounters[0].admission_time.is_some());
    assert!(encounters[0].discharge_time.is_none());
    assert!(!encounters[0].readmitted_flag);
    assert!(encounters[1].patient_key.is_none());

    let analysis = analyze(encounters, &quiet_config())?;
    assert_eq!(analysis.quality.rejected_missing_patient_key, 1);
    Ok(())
}

#[test]
fn test_missing_required_column() -> Result<()> {
    let schema = Schema::new(vec![Field::new("patient_key", DataType::Utf8, true)]);
    let columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(vec!["A"]))];
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;

    let err = decode_encounters(&batch).unwrap_err();
    assert!(matches!(err, AnalyticsError::ColumnNotFound(ref c) if c == "admission_time"));
    Ok(())
}

#[test]
fn test_wrong_column_type() -> Result<()> {
    let mut batch = encounter_batch(&sample_encounters())?;
    let index = batch.schema().index_of("diagnosis")?;
    batch.remove_column(index);
    let schema = Schema::new(
        batch
            .schema()
            .fields()
            .iter()
            .cloned()
            .chain(std::iter::once(Arc::new(Field::new(
                "diagnosis",
                DataType::Int64,
                true,
            ))))
            .collect::<Vec<_>>(),
    );
    let mut columns = batch.columns().to_vec();
    columns.push(Arc::new(Int64Array::from(vec![1; batch.num_rows()])));
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;

    let err = decode_encounters(&batch).unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidDataType { ref column, .. } if column == "diagnosis"));
    Ok(())
}

#[test]
fn test_encounter_table_export() -> Result<()> {
    let dir = temp_dir("export");
    let analysis = analyze(sample_encounters(), &quiet_config())?;

    let path = write_table(&dir, "encounters", &analysis.records)?;
    assert!(path.exists());

    let batches = read_parquet(&path, 1024)?;
    let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
    assert_eq!(rows, analysis.records.len());

    let schema = batches[0].schema();
    for column in ["patient_key", "gap_days", "risk_tier", "episode_id"] {
        assert!(schema.index_of(column).is_ok(), "missing {column}");
    }

    let decoded: Vec<EncounterRecord> = serde_arrow::from_record_batch(&batches[0])?;
    assert_eq!(decoded, analysis.records);
    Ok(())
}

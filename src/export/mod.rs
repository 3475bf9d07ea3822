//! Output export
//!
//! Output tables are plain serde structs. Their Arrow schema is traced with
//! `serde_arrow` from a fixed set of sample rows per type, so the schema does
//! not depend on the batch and empty tables still get every column.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use arrow::datatypes::FieldRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::algorithm::pipeline::Analysis;
use crate::algorithm::statistics::{Dimension, FlagAgreement, Measure, TierShare};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::models::quality::DataQualityReport;
use crate::utils::logging::log_operation_complete;

/// Output table file names, without extension
pub mod tables {
    /// Encounter stream
    pub const ENCOUNTERS: &str = "encounters";
    /// Episodes of care
    pub const EPISODES: &str = "episodes";
    /// Gap statistics per risk tier
    pub const TIER_GAP_STATS: &str = "tier_gap_stats";
    /// Cost statistics per diagnosis
    pub const DIAGNOSIS_COST_STATS: &str = "diagnosis_cost_stats";
    /// Frequent-flyer cohort
    pub const FREQUENT_FLYERS: &str = "frequent_flyers";
    /// Composite risk per patient
    pub const COMPOSITE_RISK: &str = "composite_risk";
    /// Cost ranking over all encounters
    pub const COST_RANKING: &str = "cost_ranking";
    /// Batch report file name
    pub const QUALITY_REPORT: &str = "quality.json";
}

/// A row type of an output table
pub trait ExportRow: Serialize + DeserializeOwned + Sized {
    /// Rows the Arrow schema is traced from
    ///
    /// Together they must set every optional field at least once and leave
    /// it empty at least once, so that each column gets its value type and
    /// is marked nullable.
    fn schema_samples() -> Vec<Self>;
}

/// Tracing options shared by every output table
fn tracing_options() -> TracingOptions {
    TracingOptions::default()
        .allow_null_fields(true)
        .enums_without_data_as_strings(true)
}

/// Arrow fields of an output row type
///
/// # Errors
/// Returns an error if the sample rows cannot be traced
pub fn fields_for<T: ExportRow>() -> Result<Vec<FieldRef>> {
    Ok(Vec::<FieldRef>::from_samples(
        &T::schema_samples(),
        tracing_options(),
    )?)
}

/// Convert output rows into a record batch
///
/// # Errors
/// Returns an error if the rows cannot be serialized
pub fn to_record_batch<T: ExportRow>(rows: &[T]) -> Result<RecordBatch> {
    let fields = fields_for::<T>()?;
    Ok(serde_arrow::to_record_batch(&fields, &rows)?)
}

/// Write a record batch to a Parquet file
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path)?;
    let properties = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(properties))?;
    writer.write(batch)?;
    writer.close()?;

    log_operation_complete("wrote", path, batch.num_rows(), None);
    Ok(())
}

/// Write output rows as `<name>.parquet` in `dir`
///
/// # Errors
/// Returns an error if the rows cannot be converted or written
pub fn write_table<T: ExportRow>(dir: &Path, name: &str, rows: &[T]) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.parquet"));
    write_parquet(&path, &to_record_batch(rows)?)?;
    Ok(path)
}

/// Write a value as pretty-printed JSON
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn write_json_report<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    log::info!("Wrote report {}", path.display());
    Ok(())
}

/// Batch-level summary written next to the output tables
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport<'a> {
    /// Anomaly counts
    pub quality: &'a DataQualityReport,
    /// Encounters per risk tier
    pub tier_distribution: Vec<TierShare>,
    /// Supplied flag against the derived indicator
    pub flag_agreement: FlagAgreement,
    /// Patients in the frequent-flyer cohort
    pub frequent_flyers: usize,
    /// Configuration the batch ran with
    pub config: &'a AnalyticsConfig,
}

/// Write every output table of an analysis and the batch report into `dir`
///
/// The directory is created if needed. Returns the report that was written.
///
/// # Errors
/// Returns an error if the directory cannot be created or any table fails
/// to convert or write
pub fn write_analysis<'a>(dir: &Path, analysis: &'a Analysis) -> Result<BatchReport<'a>> {
    std::fs::create_dir_all(dir)?;

    let frequent_flyers = analysis.frequent_flyers();
    write_table(dir, tables::ENCOUNTERS, &analysis.records)?;
    write_table(dir, tables::EPISODES, &analysis.episodes)?;
    write_table(
        dir,
        tables::TIER_GAP_STATS,
        &analysis.distribution(Dimension::RiskTier, Measure::Gap).rows,
    )?;
    write_table(
        dir,
        tables::DIAGNOSIS_COST_STATS,
        &analysis.distribution(Dimension::Diagnosis, Measure::Cost).rows,
    )?;
    write_table(dir, tables::FREQUENT_FLYERS, &frequent_flyers)?;
    write_table(dir, tables::COMPOSITE_RISK, &analysis.composite)?;
    write_table(
        dir,
        tables::COST_RANKING,
        &analysis.ranked_encounters(Measure::Cost)?,
    )?;

    let report = BatchReport {
        quality: &analysis.quality,
        tier_distribution: analysis.tier_distribution(),
        flag_agreement: analysis.flag_agreement(),
        frequent_flyers: frequent_flyers.len(),
        config: &analysis.config,
    };
    write_json_report(&dir.join(tables::QUALITY_REPORT), &report)?;
    Ok(report)
}

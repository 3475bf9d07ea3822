use std::path::Path;

use readmit::algorithm::pipeline::RankedEncounter;
use readmit::algorithm::risk::CompositeRiskRow;
use readmit::algorithm::statistics::{CohortStat, FrequentFlyer};
use readmit::algorithm::timeline::Episode;
use readmit::export::{tables, write_analysis};
use readmit::utils::read_parquet;
use readmit::{Dimension, EncounterRecord, Measure, Result, analyze};
use serde::de::DeserializeOwned;

use crate::utils::{quiet_config, sample_encounters, temp_dir};

fn read_table<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>> {
    let path = dir.join(format!("{name}.parquet"));
    let mut rows = Vec::new();
    for batch in read_parquet(&path, 1024)? {
        rows.extend(serde_arrow::from_record_batch::<Vec<T>>(&batch)?);
    }
    Ok(rows)
}

#[test]
fn test_every_output_table_reads_back() -> Result<()> {
    let dir = temp_dir("write-analysis");
    let analysis = analyze(sample_encounters(), &quiet_config())?;
    let report = write_analysis(&dir, &analysis)?;

    let records: Vec<EncounterRecord> = read_table(&dir, tables::ENCOUNTERS)?;
    assert_eq!(records, analysis.records);

    let episodes: Vec<Episode> = read_table(&dir, tables::EPISODES)?;
    assert_eq!(episodes, analysis.episodes);

    let tier_gaps: Vec<CohortStat> = read_table(&dir, tables::TIER_GAP_STATS)?;
    assert_eq!(
        tier_gaps,
        analysis.distribution(Dimension::RiskTier, Measure::Gap).rows
    );

    let diagnosis_costs: Vec<CohortStat> = read_table(&dir, tables::DIAGNOSIS_COST_STATS)?;
    assert_eq!(
        diagnosis_costs,
        analysis.distribution(Dimension::Diagnosis, Measure::Cost).rows
    );

    let flyers: Vec<FrequentFlyer> = read_table(&dir, tables::FREQUENT_FLYERS)?;
    assert_eq!(flyers, analysis.frequent_flyers());
    assert_eq!(report.frequent_flyers, flyers.len());

    let composite: Vec<CompositeRiskRow> = read_table(&dir, tables::COMPOSITE_RISK)?;
    assert_eq!(composite, analysis.composite);

    let ranking: Vec<RankedEncounter> = read_table(&dir, tables::COST_RANKING)?;
    assert_eq!(ranking, analysis.ranked_encounters(Measure::Cost)?);

    let text = std::fs::read_to_string(dir.join(tables::QUALITY_REPORT))?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(value["quality"]["total_input"], 8);
    assert_eq!(value["tier_distribution"].as_array().map(Vec::len), Some(5));
    assert_eq!(value["frequent_flyers"], 1);
    Ok(())
}

#[test]
fn test_empty_analysis_writes_empty_tables() -> Result<()> {
    let dir = temp_dir("write-empty");
    let analysis = analyze(Vec::new(), &quiet_config())?;
    write_analysis(&dir, &analysis)?;

    let records: Vec<EncounterRecord> = read_table(&dir, tables::ENCOUNTERS)?;
    assert!(records.is_empty());

    let batches = read_parquet(&dir.join(format!("{}.parquet", tables::EPISODES)), 1024)?;
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(rows, 0);
    Ok(())
}

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, bail};
use log::info;
use readmit::export::write_analysis;
use readmit::utils::logging::{create_spinner, finish_progress_bar};
use readmit::{AnalyticsConfig, analyze, load_encounters_async};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

const DEFAULT_OUTPUT_DIR: &str = "readmit_output";
const USAGE: &str = "usage: readmit <input parquet file or directory> [output dir] [config.json]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let output_dir = args
        .next()
        .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from);
    let config = match args.next() {
        Some(path) => AnalyticsConfig::from_json_file(Path::new(&path))
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => AnalyticsConfig::default(),
    };
    info!("{config}");

    let start = Instant::now();
    let spinner = create_spinner(Some("Loading encounters"), config.show_progress);
    let raw = load_encounters_async(&input, config.effective_batch_size())
        .await
        .with_context(|| format!("Failed to load encounters from {}", input.display()))?;
    finish_progress_bar(&spinner, Some("Encounters loaded"));

    let analysis = tokio::task::spawn_blocking(move || analyze(raw, &config)).await??;

    let spinner = create_spinner(Some("Writing output tables"), analysis.config.show_progress);
    let report = write_analysis(&output_dir, &analysis)
        .with_context(|| format!("Failed to write output to {}", output_dir.display()))?;
    finish_progress_bar(&spinner, Some("Output written"));

    info!("{}", analysis.quality);
    for share in &report.tier_distribution {
        info!(
            "  {:<12} {:>8} ({:.1}%)",
            share.risk_tier.label(),
            share.count,
            share.pct_of_total
        );
    }
    if let Some(rate) = report.flag_agreement.agreement_rate() {
        info!("Readmission flag agreement: {:.1}%", rate * 100.0);
    }
    info!(
        "Wrote {} encounters, {} episodes and {} frequent flyers to {} in {:?}",
        analysis.records.len(),
        analysis.episodes.len(),
        report.frequent_flyers,
        output_dir.display(),
        start.elapsed()
    );

    Ok(())
}

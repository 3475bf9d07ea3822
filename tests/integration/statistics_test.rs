use readmit::algorithm::statistics::rank;
use readmit::{Dimension, Measure, RankOrder, Result, RiskTier, analyze};

use crate::utils::{quiet_config, sample_encounters};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_gap_distribution_by_tier() -> Result<()> {
    let analysis = analyze(sample_encounters(), &quiet_config())?;
    let table = analysis.distribution(Dimension::RiskTier, Measure::Gap);

    assert_eq!(table.measured_total, 5);
    assert_eq!(table.indeterminate, 3);
    assert!(table.row("FIRST_VISIT").is_none());

    let groups: Vec<_> = table.rows.iter().map(|r| r.group_key.as_str()).collect();
    assert_eq!(groups, vec!["CRITICAL", "MODERATE"]);

    let critical = table.row("CRITICAL").expect("critical row");
    assert_eq!(critical.count, 2);
    assert!(close(critical.mean, 4.0));
    assert!(close(critical.median, 4.0));
    assert!(close(critical.min, 1.0));
    assert!(close(critical.max, 7.0));
    assert!(close(critical.pct_of_total, 40.0));

    let moderate = table.row("MODERATE").expect("moderate row");
    assert_eq!(moderate.count, 3);
    assert!(close(moderate.mean, 65.0 / 3.0));
    assert!(close(moderate.median, 24.0));
    assert!(close(moderate.pct_of_total, 60.0));
    Ok(())
}

#[test]
fn test_percentages_sum_to_one_hundred() -> Result<()> {
    let analysis = analyze(sample_encounters(), &quiet_config())?;

    for (dimension, measure) in [
        (Dimension::RiskTier, Measure::Gap),
        (Dimension::Diagnosis, Measure::Cost),
        (Dimension::Patient, Measure::LengthOfStay),
    ] {
        let table = analysis.distribution(dimension, measure);
        let total: f64 = table.rows.iter().map(|r| r.pct_of_total).sum();
        assert!(close(total, 100.0), "{dimension} x {measure}: {total}");
    }

    let tiers: f64 = analysis
        .tier_distribution()
        .iter()
        .map(|share| share.pct_of_total)
        .sum();
    assert!(close(tiers, 100.0));
    Ok(())
}

#[test]
fn test_cost_by_diagnosis_reports_unknown() -> Result<()> {
    let analysis = analyze(sample_encounters(), &quiet_config())?;
    let table = analysis.distribution(Dimension::Diagnosis, Measure::Cost);

    // R has neither a diagnosis nor a bill
    assert_eq!(table.indeterminate, 1);
    assert!(table.row("UNKNOWN").is_none());

    let heart_failure = table.row("Heart Failure").expect("heart failure row");
    assert_eq!(heart_failure.count, 4);
    assert!(close(heart_failure.median, 4000.0));
    assert!(close(heart_failure.max, 9000.0));
    Ok(())
}

#[test]
fn test_tier_distribution_lists_every_tier() -> Result<()> {
    let analysis = analyze(sample_encounters(), &quiet_config())?;
    let counts: Vec<_> = analysis
        .tier_distribution()
        .iter()
        .map(|share| (share.risk_tier, share.count))
        .collect();

    assert_eq!(
        counts,
        vec![
            (RiskTier::FirstVisit, 3),
            (RiskTier::Critical, 2),
            (RiskTier::High, 0),
            (RiskTier::Moderate, 3),
            (RiskTier::Low, 0),
        ]
    );
    Ok(())
}

#[test]
fn test_frequent_flyers() -> Result<()> {
    let analysis = analyze(sample_encounters(), &quiet_config())?;
    let flyers = analysis.frequent_flyers();

    assert_eq!(flyers.len(), 1);
    let q = &flyers[0];
    assert_eq!(q.patient_key, "Q");
    assert_eq!(q.total_readmissions, 3);
    assert_eq!(q.avg_gap, Some(8.0));
    assert_eq!(q.min_gap, Some(1));
    assert_eq!(q.max_gap, Some(16));
    assert_eq!(q.pct_rapid_readmit, Some(100.0));
    assert!(close(q.total_bill, 20000.0));

    let lenient = quiet_config().with_frequent_flyer_min_readmissions(2);
    let flyers = analyze(sample_encounters(), &lenient)?.frequent_flyers();
    let keys: Vec<_> = flyers.iter().map(|f| f.patient_key.as_str()).collect();
    assert_eq!(keys, vec!["Q", "P"]);
    Ok(())
}

#[test]
fn test_flag_agreement() -> Result<()> {
    let analysis = analyze(sample_encounters(), &quiet_config())?;
    let agreement = analysis.flag_agreement();

    // Only Q's first stay carries the supplied flag, and Q returned after 7 days
    assert_eq!(agreement.both, 1);
    assert_eq!(agreement.flag_only, 0);
    assert_eq!(agreement.derived_only, 4);
    assert_eq!(agreement.neither, 3);
    assert_eq!(agreement.total(), analysis.records.len());
    assert_eq!(agreement.agreement_rate(), Some(0.5));
    Ok(())
}

#[test]
fn test_cost_ranking() -> Result<()> {
    let analysis = analyze(sample_encounters(), &quiet_config())?;
    let rows = analysis.ranked_encounters(Measure::Cost)?;

    assert_eq!(rows.len(), 7);
    let values: Vec<_> = rows.iter().map(|r| r.value).collect();
    assert_eq!(
        values,
        vec![12000.0, 9000.0, 8100.0, 5200.0, 4000.0, 4000.0, 3000.0]
    );
    let competition: Vec<_> = rows.iter().map(|r| r.competition_rank).collect();
    assert_eq!(competition, vec![1, 2, 3, 4, 5, 5, 7]);
    let dense: Vec<_> = rows.iter().map(|r| r.dense_rank).collect();
    assert_eq!(dense, vec![1, 2, 3, 4, 5, 5, 6]);
    let buckets: Vec<_> = rows.iter().map(|r| r.bucket).collect();
    assert_eq!(buckets, vec![1, 1, 2, 2, 3, 3, 4]);

    assert!(close(rows[0].cume_dist, 1.0));
    assert!(close(rows[4].cume_dist, 3.0 / 7.0));
    assert!(close(rows[6].cume_dist, 1.0 / 7.0));

    let ranking = analysis.rank(Measure::Cost)?;
    let unranked = &analysis.records[ranking.unranked[0]];
    assert_eq!(unranked.patient_key, "R");
    Ok(())
}

#[test]
fn test_ties_share_ranks() -> Result<()> {
    let values = [Some(100.0), Some(100.0), Some(90.0)];
    let ranking = rank(&values, 4, RankOrder::Descending)?;

    let competition: Vec<_> = ranking.ranked.iter().map(|r| r.competition_rank).collect();
    let dense: Vec<_> = ranking.ranked.iter().map(|r| r.dense_rank).collect();
    assert_eq!(competition, vec![1, 1, 3]);
    assert_eq!(dense, vec![1, 1, 2]);

    let ascending = rank(&values, 4, RankOrder::Ascending)?;
    assert_eq!(ascending.ranked[0].value, 90.0);
    assert_eq!(ascending.ranked[0].competition_rank, 1);
    assert_eq!(ascending.ranked[1].competition_rank, 2);
    Ok(())
}

#[test]
fn test_bucket_sizes_differ_by_at_most_one() -> Result<()> {
    let values: Vec<_> = (0..10).map(|v| Some(f64::from(v))).collect();
    let ranking = rank(&values, 4, RankOrder::Ascending)?;

    let mut sizes = [0usize; 4];
    for ranked in &ranking.ranked {
        sizes[ranked.bucket - 1] += 1;
    }
    assert_eq!(sizes, [3, 3, 2, 2]);
    Ok(())
}

use readmit::algorithm::risk::{RiskSnapshot, composite_score};
use readmit::models::AdmissionType;
use readmit::{Result, RiskLabel, analyze};

use crate::utils::{quiet_config, sample_encounters};

#[test]
fn test_composite_row_per_patient() -> Result<()> {
    let analysis = analyze(sample_encounters(), &quiet_config())?;

    let keys: Vec<_> = analysis
        .composite
        .iter()
        .map(|row| row.patient_key.as_str())
        .collect();
    assert_eq!(keys, vec!["P", "Q", "R"]);

    // Q's latest stay: 85 years, heart failure, emergency, comorbidity 8,
    // 14 days, three admissions in the preceding year
    let q = &analysis.composite[1];
    assert_eq!(q.score, 140);
    assert_eq!(q.label, RiskLabel::High);
    assert_eq!(q.lace_total, 7 + 3 + 5 + 3);

    // P's latest stay: 9 days with two prior admissions and nothing else
    let p = &analysis.composite[0];
    assert_eq!(p.score, 0);
    assert_eq!(p.label, RiskLabel::Low);
    assert_eq!(p.lace_total, 5 + 2);
    Ok(())
}

#[test]
fn test_prior_admission_window() -> Result<()> {
    let narrow = quiet_config().with_prior_admission_window(30);
    let analysis = analyze(sample_encounters(), &narrow)?;

    let q_prior: Vec<_> = analysis
        .records
        .iter()
        .filter(|r| r.patient_key == "Q")
        .map(|r| r.prior_admissions)
        .collect();
    assert_eq!(q_prior, vec![0, 1, 2, 2]);
    Ok(())
}

#[test]
fn test_label_bands() {
    let base = RiskSnapshot {
        diagnosis: Some("Heart Failure".to_string()),
        ..RiskSnapshot::default()
    };

    // 30 + 4 * 5 = 50
    let medium = RiskSnapshot {
        comorbidity_score: Some(4),
        ..base.clone()
    };
    assert_eq!(composite_score(&medium).score, 50);
    assert_eq!(composite_score(&medium).label, RiskLabel::Medium);

    // 30 + 10 + 8 * 5 = 80
    let high = RiskSnapshot {
        admission_type: Some(AdmissionType::Emergency),
        comorbidity_score: Some(8),
        ..base.clone()
    };
    assert_eq!(composite_score(&high).score, 80);
    assert_eq!(composite_score(&high).label, RiskLabel::High);

    // 30 + 3 * 5 = 45
    let low = RiskSnapshot {
        comorbidity_score: Some(3),
        ..base
    };
    assert_eq!(composite_score(&low).label, RiskLabel::Low);
}

#[test]
fn test_age_threshold_is_strict() {
    let seventy = RiskSnapshot {
        age: Some(70),
        ..RiskSnapshot::default()
    };
    let seventy_one = RiskSnapshot {
        age: Some(71),
        ..RiskSnapshot::default()
    };
    assert_eq!(composite_score(&seventy).score, 0);
    assert_eq!(composite_score(&seventy_one).score, 20);
}

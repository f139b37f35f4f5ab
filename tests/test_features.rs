//! Tests for the fitted feature transform

use lendscore::error::ScoreError;
use lendscore::pipeline::features::{FitOptions, TransformConfig};
use lendscore::pipeline::OTHER_CATEGORY;

#[path = "common/mod.rs"]
mod common;

fn fit_config(rows: usize) -> TransformConfig {
    let (records, targets) = common::separable_dataset(rows);
    TransformConfig::fit(
        &records,
        &targets,
        None,
        FitOptions {
            woe_bins: 4,
            min_category_samples: 2,
            ..FitOptions::default()
        },
    )
    .unwrap()
}

#[test]
fn test_output_matches_feature_names_exactly() {
    let config = fit_config(60);
    let record = common::sample_record(3);

    let features = config.transform(&record).unwrap();

    assert_eq!(
        features.len(),
        config.feature_names().len(),
        "one value per configured feature name"
    );
    assert!(config.num_features() > 10);
}

#[test]
fn test_feature_name_order_is_stable() {
    let config_a = fit_config(60);
    let config_b = fit_config(60);

    assert_eq!(config_a.feature_names(), config_b.feature_names());

    // Passthrough block leads, interactions trail
    let names = config_a.feature_names();
    assert_eq!(names[0], "loan_amnt");
    assert!(names.contains(&"emp_length_te".to_string()));
    assert!(names.contains(&"dti_woe".to_string()));
    assert!(names.contains(&"revol_util_woe".to_string()));
    assert!(names.contains(&"loan_to_income".to_string()));
    assert!(names.contains(&"dti_emp_inter".to_string()));
}

#[test]
fn test_transform_is_deterministic() {
    let config = fit_config(60);
    let record = common::sample_record(17);

    let first = config.transform(&record).unwrap();
    let second = config.transform(&record).unwrap();

    assert_eq!(first, second, "same record, same config, same vector");
}

#[test]
fn test_unseen_category_maps_to_other_bucket() {
    let config = fit_config(60);
    let names = config.feature_names();

    let mut record = common::sample_record(0);
    record.purpose = "yacht_purchase".to_string();

    let features = config.transform(&record).unwrap();

    let other_idx = names
        .iter()
        .position(|n| n == &format!("purpose_{}", OTHER_CATEGORY))
        .expect("purpose OTHER column exists");
    assert_eq!(features[other_idx], 1.0, "unseen category fires OTHER");

    // No other purpose indicator fires
    for (i, name) in names.iter().enumerate() {
        if name.starts_with("purpose_") && i != other_idx {
            assert_eq!(features[i], 0.0, "{} should be cold", name);
        }
    }
}

#[test]
fn test_seen_category_does_not_fire_other() {
    let config = fit_config(60);
    let names = config.feature_names();
    let record = common::sample_record(0);

    let features = config.transform(&record).unwrap();

    let hit_idx = names
        .iter()
        .position(|n| n == &format!("purpose_{}", record.purpose))
        .expect("training category has its own column");
    let other_idx = names
        .iter()
        .position(|n| n == &format!("purpose_{}", OTHER_CATEGORY))
        .unwrap();

    assert_eq!(features[hit_idx], 1.0);
    assert_eq!(features[other_idx], 0.0);
}

#[test]
fn test_unseen_emp_length_falls_back_to_prior() {
    let config = fit_config(60);
    let names = config.feature_names();
    let te_idx = names.iter().position(|n| n == "emp_length_te").unwrap();

    let mut record = common::sample_record(0);
    record.emp_length = 37.0; // never seen in training

    let features = config.transform(&record).unwrap();
    let (_, targets) = common::separable_dataset(60);
    // The prior is close to the split's training-side event rate; just check
    // it is a sane probability rather than a raw level rate
    let global_rate = targets.iter().filter(|t| **t == 1).count() as f64 / targets.len() as f64;
    assert!((features[te_idx] - global_rate).abs() < 0.25);
    assert!((0.0..=1.0).contains(&features[te_idx]));
}

#[test]
fn test_feature_names_unique_even_with_raw_other_category() {
    // A dataset whose home_ownership column literally contains "OTHER"
    let (mut records, targets) = common::separable_dataset(60);
    for record in records.iter_mut().step_by(4) {
        record.home_ownership = "OTHER".to_string();
    }

    let config = TransformConfig::fit(
        &records,
        &targets,
        None,
        FitOptions {
            woe_bins: 4,
            min_category_samples: 2,
            ..FitOptions::default()
        },
    )
    .unwrap();

    let mut names = config.feature_names().to_vec();
    names.sort();
    names.dedup();
    assert_eq!(
        names.len(),
        config.feature_names().len(),
        "feature names must be unique"
    );

    // Raw OTHER rows flow into the fallback column
    let record = &records[0];
    assert_eq!(record.home_ownership, "OTHER");
    let features = config.transform(record).unwrap();
    let other_idx = config
        .feature_names()
        .iter()
        .position(|n| n == &format!("home_ownership_{}", OTHER_CATEGORY))
        .unwrap();
    assert_eq!(features[other_idx], 1.0);
}

#[test]
fn test_interaction_terms() {
    let config = fit_config(60);
    let names = config.feature_names();
    let record = common::sample_record(5);

    let features = config.transform(&record).unwrap();

    let lti_idx = names.iter().position(|n| n == "loan_to_income").unwrap();
    let inter_idx = names.iter().position(|n| n == "dti_emp_inter").unwrap();

    assert!((features[lti_idx] - record.loan_amnt / (record.annual_inc + 1.0)).abs() < 1e-12);
    assert!((features[inter_idx] - record.dti * record.emp_length).abs() < 1e-12);
}

#[test]
fn test_non_finite_input_is_validation_error() {
    let config = fit_config(60);

    let mut record = common::sample_record(0);
    record.annual_inc = f64::NAN;

    let err = config.transform(&record).unwrap_err();
    match err {
        ScoreError::Validation(msg) => {
            assert!(msg.contains("annual_inc"), "message was: {}", msg)
        }
        other => panic!("expected Validation error, got {:?}", other),
    }
}

#[test]
fn test_fit_rejects_empty_training_set() {
    let result = TransformConfig::fit(&[], &[], None, FitOptions::default());
    assert!(result.is_err());
}

#[test]
fn test_config_roundtrips_through_json() {
    let config = fit_config(60);
    let record = common::sample_record(9);
    let before = config.transform(&record).unwrap();

    let json = serde_json::to_string(&config).unwrap();
    let restored: TransformConfig = serde_json::from_str(&json).unwrap();
    let after = restored.transform(&record).unwrap();

    assert_eq!(config.feature_names(), restored.feature_names());
    assert_eq!(before, after);
}

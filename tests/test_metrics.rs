//! Tests for ranking and classification metrics

use lendscore::train::{f1_score, gini, roc_auc};

#[test]
fn test_auc_perfect_ranking() {
    let targets = vec![0, 0, 0, 1, 1, 1];
    let scores = vec![0.1, 0.2, 0.3, 0.7, 0.8, 0.9];

    assert!((roc_auc(&targets, &scores) - 1.0).abs() < 1e-12);
}

#[test]
fn test_auc_inverted_ranking() {
    let targets = vec![1, 1, 1, 0, 0, 0];
    let scores = vec![0.1, 0.2, 0.3, 0.7, 0.8, 0.9];

    assert!(roc_auc(&targets, &scores).abs() < 1e-12);
}

#[test]
fn test_auc_constant_scores_is_half() {
    let targets = vec![0, 1, 0, 1, 0, 1];
    let scores = vec![0.5; 6];

    assert!((roc_auc(&targets, &scores) - 0.5).abs() < 1e-12);
}

#[test]
fn test_auc_with_ties_uses_average_ranks() {
    // Two tied scores shared by one positive and one negative contribute 0.5
    let targets = vec![0, 1, 0, 1];
    let scores = vec![0.2, 0.4, 0.4, 0.8];

    // Pairs: (0.2-,0.4+)=1, (0.2-,0.8+)=1, (0.4-,0.4+)=0.5, (0.4-,0.8+)=1
    // AUC = 3.5 / 4
    assert!((roc_auc(&targets, &scores) - 0.875).abs() < 1e-12);
}

#[test]
fn test_auc_degenerate_single_class() {
    assert_eq!(roc_auc(&[1, 1, 1], &[0.1, 0.5, 0.9]), 0.5);
    assert_eq!(roc_auc(&[0, 0], &[0.1, 0.9]), 0.5);
    assert_eq!(roc_auc(&[], &[]), 0.5);
}

#[test]
fn test_gini_rescales_auc() {
    let targets = vec![0, 0, 1, 1];
    let scores = vec![0.1, 0.2, 0.8, 0.9];

    assert!((gini(&targets, &scores) - 1.0).abs() < 1e-12);

    let constant = vec![0.5; 4];
    assert!(gini(&targets, &constant).abs() < 1e-12);
}

#[test]
fn test_f1_at_threshold() {
    let targets = vec![1, 1, 0, 0];
    let scores = vec![0.9, 0.4, 0.6, 0.1];

    // At 0.5: tp=1 (0.9), fp=1 (0.6), fn=1 (0.4) -> f1 = 2/4
    assert!((f1_score(&targets, &scores, 0.5) - 0.5).abs() < 1e-12);

    // At 0.3: tp=2, fp=1, fn=0 -> f1 = 4/5
    assert!((f1_score(&targets, &scores, 0.3) - 0.8).abs() < 1e-12);
}

#[test]
fn test_f1_no_predictions_no_positives() {
    let targets = vec![0, 0, 0];
    let scores = vec![0.1, 0.1, 0.1];

    assert_eq!(f1_score(&targets, &scores, 0.5), 0.0);
}

//! Ranking and classification metrics for trained models.

/// Area under the ROC curve via the Mann-Whitney U statistic.
///
/// Ties receive average ranks, so constant scores yield exactly 0.5.
/// Degenerate inputs (empty, single-class) also yield 0.5.
pub fn roc_auc(targets: &[i32], scores: &[f64]) -> f64 {
    debug_assert_eq!(targets.len(), scores.len());

    let n_pos = targets.iter().filter(|t| **t == 1).count() as f64;
    let n_neg = targets.iter().filter(|t| **t == 0).count() as f64;
    if n_pos <= 0.0 || n_neg <= 0.0 {
        return 0.5;
    }

    let mut pairs: Vec<(f64, i32)> = scores.iter().copied().zip(targets.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let n = pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut i = 0;

    while i < n {
        let mut j = i;
        while j < n && (pairs[j].0 - pairs[i].0).abs() < 1e-12 {
            j += 1;
        }

        // Average 1-based rank over the tie group spanning positions i..j
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for pair in &pairs[i..j] {
            if pair.1 == 1 {
                rank_sum_pos += avg_rank;
            }
        }

        i = j;
    }

    let u = rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0;
    u / (n_pos * n_neg)
}

/// Gini coefficient, the credit-scoring rescale of AUC.
pub fn gini(targets: &[i32], scores: &[f64]) -> f64 {
    2.0 * roc_auc(targets, scores) - 1.0
}

/// F1 score of the binary labels obtained at `threshold`.
pub fn f1_score(targets: &[i32], scores: &[f64], threshold: f64) -> f64 {
    debug_assert_eq!(targets.len(), scores.len());

    let mut tp = 0.0f64;
    let mut fp = 0.0f64;
    let mut fn_ = 0.0f64;

    for (&target, &score) in targets.iter().zip(scores.iter()) {
        let predicted = score >= threshold;
        match (predicted, target == 1) {
            (true, true) => tp += 1.0,
            (true, false) => fp += 1.0,
            (false, true) => fn_ += 1.0,
            (false, false) => {}
        }
    }

    if 2.0 * tp + fp + fn_ == 0.0 {
        return 0.0;
    }
    2.0 * tp / (2.0 * tp + fp + fn_)
}

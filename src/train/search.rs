//! Random hyperparameter search over GBDT training parameters.
//!
//! Each trial draws a parameter set from [`SearchSpace`], fits on the
//! training split, and is scored by validation AUC. Trials run in parallel
//! via rayon with deterministic per-trial seeds; the boosting itself is the
//! `gbdt` crate's.

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ScoreError;
use crate::train::metrics::roc_auc;

/// One candidate GBDT parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HyperParams {
    /// Boosting rounds
    pub iterations: usize,
    /// Maximum tree depth
    pub max_depth: u32,
    /// Learning rate
    pub shrinkage: f64,
    /// Minimum samples per leaf
    pub min_leaf_size: usize,
    /// Row subsampling ratio per tree
    pub data_sample_ratio: f64,
    /// Feature subsampling ratio per tree
    pub feature_sample_ratio: f64,
}

impl HyperParams {
    /// Build the `gbdt` training configuration for these parameters.
    pub fn to_gbdt_config(&self, feature_size: usize) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(feature_size);
        cfg.set_max_depth(self.max_depth);
        cfg.set_iterations(self.iterations);
        cfg.set_shrinkage(self.shrinkage as f32);
        cfg.set_min_leaf_size(self.min_leaf_size);
        cfg.set_data_sample_ratio(self.data_sample_ratio);
        cfg.set_feature_sample_ratio(self.feature_sample_ratio);
        cfg.set_loss("LogLikelyhood");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg
    }
}

impl std::fmt::Display for HyperParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "iters={} depth={} lr={:.4} leaf={} rows={:.2} feats={:.2}",
            self.iterations,
            self.max_depth,
            self.shrinkage,
            self.min_leaf_size,
            self.data_sample_ratio,
            self.feature_sample_ratio
        )
    }
}

/// Ranges random search draws from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpace {
    pub iterations: (usize, usize),
    pub max_depth: (u32, u32),
    /// Sampled log-uniformly
    pub shrinkage: (f64, f64),
    pub min_leaf_size: (usize, usize),
    pub data_sample_ratio: (f64, f64),
    pub feature_sample_ratio: (f64, f64),
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            iterations: (50, 300),
            max_depth: (3, 8),
            shrinkage: (0.01, 0.3),
            min_leaf_size: (20, 100),
            data_sample_ratio: (0.6, 1.0),
            feature_sample_ratio: (0.6, 1.0),
        }
    }
}

impl SearchSpace {
    /// Draw one candidate parameter set.
    pub fn sample(&self, rng: &mut StdRng) -> HyperParams {
        let (lr_lo, lr_hi) = self.shrinkage;
        let shrinkage = (rng.gen_range(lr_lo.ln()..=lr_hi.ln())).exp();

        HyperParams {
            iterations: rng.gen_range(self.iterations.0..=self.iterations.1),
            max_depth: rng.gen_range(self.max_depth.0..=self.max_depth.1),
            shrinkage,
            min_leaf_size: rng.gen_range(self.min_leaf_size.0..=self.min_leaf_size.1),
            data_sample_ratio: rng.gen_range(self.data_sample_ratio.0..=self.data_sample_ratio.1),
            feature_sample_ratio: rng
                .gen_range(self.feature_sample_ratio.0..=self.feature_sample_ratio.1),
        }
    }
}

/// Outcome of one search trial.
#[derive(Debug, Clone, Serialize)]
pub struct TrialResult {
    pub trial: usize,
    pub params: HyperParams,
    pub validation_auc: f64,
}

/// Build the `gbdt` training rows for a feature matrix.
///
/// Log-likelihood loss expects labels in {-1, 1}.
pub fn to_training_data(features: &[Vec<f64>], targets: &[i32]) -> DataVec {
    features
        .iter()
        .zip(targets.iter())
        .map(|(row, &target)| {
            let label = if target == 1 { 1.0 } else { -1.0 };
            Data::new_training_data(row.iter().map(|v| *v as f32).collect(), 1.0, label, None)
        })
        .collect()
}

/// Build `gbdt` scoring rows for a feature matrix.
pub fn to_test_data(features: &[Vec<f64>]) -> DataVec {
    features
        .iter()
        .map(|row| Data::new_test_data(row.iter().map(|v| *v as f32).collect(), None))
        .collect()
}

/// Fit one GBDT with the given parameters.
pub fn fit_model(params: &HyperParams, train_data: &DataVec, feature_size: usize) -> GBDT {
    let cfg = params.to_gbdt_config(feature_size);
    let mut model = GBDT::new(&cfg);
    // fit() consumes residual slots in the rows, so train on a copy
    let mut rows = train_data.clone();
    model.fit(&mut rows);
    model
}

/// Fit one GBDT and return it along with its validation scores.
pub fn fit_and_score(
    params: &HyperParams,
    train_data: &DataVec,
    val_data: &DataVec,
    feature_size: usize,
) -> (GBDT, Vec<f64>) {
    let model = fit_model(params, train_data, feature_size);
    let scores: Vec<f64> = model.predict(val_data).iter().map(|p| *p as f64).collect();
    (model, scores)
}

/// Run `trials` random-search trials in parallel and return results sorted
/// by validation AUC, best first.
pub fn run_search(
    train_features: &[Vec<f64>],
    train_targets: &[i32],
    val_features: &[Vec<f64>],
    val_targets: &[i32],
    trials: usize,
    seed: u64,
    space: &SearchSpace,
) -> Result<Vec<TrialResult>, ScoreError> {
    if trials == 0 {
        return Err(ScoreError::Validation("trial count must be positive".into()));
    }
    let feature_size = train_features
        .first()
        .map(|row| row.len())
        .ok_or_else(|| ScoreError::DataFormat("no training rows".into()))?;

    let train_data = to_training_data(train_features, train_targets);
    let val_data = to_test_data(val_features);

    let pb = ProgressBar::new(trials as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   Searching [{bar:40.cyan/blue}] {pos}/{len} trials ({percent}%) [{eta}]")
            .unwrap()
            .progress_chars("=>-"),
    );
    let progress_counter = Arc::new(AtomicU64::new(0));

    let mut results: Vec<TrialResult> = (0..trials)
        .into_par_iter()
        .map(|trial| {
            // Deterministic per-trial seed so any trial can be replayed alone
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(trial as u64));
            let params = space.sample(&mut rng);

            let (_, scores) = fit_and_score(&params, &train_data, &val_data, feature_size);
            let validation_auc = roc_auc(val_targets, &scores);

            let done = progress_counter.fetch_add(1, Ordering::Relaxed);
            pb.set_position(done + 1);

            TrialResult {
                trial,
                params,
                validation_auc,
            }
        })
        .collect();

    pb.finish_with_message(format!("   [OK] {} trials complete", trials));

    results.sort_by(|a, b| {
        b.validation_auc
            .partial_cmp(&a.validation_auc)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(results)
}

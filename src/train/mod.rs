//! Trainer: split, search, refit, and artifact assembly.

pub mod metrics;
pub mod search;

pub use metrics::{f1_score, gini, roc_auc};
pub use search::{HyperParams, SearchSpace, TrialResult};

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::model::ModelArtifact;
use crate::pipeline::features::{FitOptions, MacroTable, TransformConfig};
use crate::pipeline::schema::LoanRecord;
use crate::pipeline::split::{stratified_split, take};
use crate::train::search::{fit_model, run_search, to_test_data, to_training_data};

/// Knobs for one training run.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Number of random-search trials
    pub trials: usize,
    /// Fraction of rows held out for validation
    pub validation_fraction: f64,
    /// Seed for splitting and trial sampling
    pub seed: u64,
    /// Decision threshold recorded in the artifact
    pub threshold: f64,
    /// Feature-engineering options
    pub fit: FitOptions,
    /// Optional macro-economic table joined by issue month
    pub macro_table: Option<MacroTable>,
    /// Search ranges
    pub space: SearchSpace,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            trials: 40,
            validation_fraction: 0.2,
            seed: 2025,
            threshold: 0.5,
            fit: FitOptions::default(),
            macro_table: None,
            space: SearchSpace::default(),
        }
    }
}

/// Metrics recorded alongside the winning model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// AUC of the final model over all training rows
    pub train_auc: f64,
    /// Best trial's held-out AUC from the search
    pub validation_auc: f64,
    /// F1 of the final model at the decision threshold, over all rows
    pub train_f1: f64,
    /// Gini of the final model over all rows
    pub train_gini: f64,
    /// Rows used for training
    pub rows: usize,
    /// Search trials run
    pub trials: usize,
}

/// Everything a caller wants back from a training run.
pub struct TrainOutcome {
    pub artifact: ModelArtifact,
    pub trials: Vec<TrialResult>,
}

/// Train a model end to end: stratified split, transform fit on the training
/// side, random search scored on the held-out side, refit of the winning
/// parameters on all rows, and artifact assembly.
pub fn train_model(
    records: &[LoanRecord],
    targets: &[i32],
    options: &TrainOptions,
) -> Result<TrainOutcome, ScoreError> {
    let (train_idx, val_idx) =
        stratified_split(targets, options.validation_fraction, options.seed)?;

    let train_records = take(records, &train_idx);
    let train_targets = take(targets, &train_idx);
    let val_records = take(records, &val_idx);
    let val_targets = take(targets, &val_idx);

    // Encoding tables see only the training side; target statistics must not
    // leak into the validation metric.
    let transform = TransformConfig::fit(
        &train_records,
        &train_targets,
        options.macro_table.clone(),
        options.fit.clone(),
    )?;

    let train_features = transform.transform_all(&train_records)?;
    let val_features = transform.transform_all(&val_records)?;

    let trial_results = run_search(
        &train_features,
        &train_targets,
        &val_features,
        &val_targets,
        options.trials,
        options.seed,
        &options.space,
    )?;
    let best = trial_results
        .first()
        .ok_or_else(|| ScoreError::DataFormat("search produced no trials".into()))?;

    // Refit the winning parameters on every row
    let all_features = transform.transform_all(records)?;
    let all_data = to_training_data(&all_features, targets);
    let model = fit_model(&best.params, &all_data, transform.num_features());

    let train_scores: Vec<f64> = model
        .predict(&to_test_data(&all_features))
        .iter()
        .map(|p| *p as f64)
        .collect();

    let metrics = TrainingMetrics {
        train_auc: roc_auc(targets, &train_scores),
        validation_auc: best.validation_auc,
        train_f1: f1_score(targets, &train_scores, options.threshold),
        train_gini: gini(targets, &train_scores),
        rows: records.len(),
        trials: options.trials,
    };

    let artifact = ModelArtifact::new(
        transform,
        model,
        best.params.clone(),
        metrics,
        options.threshold,
    );

    Ok(TrainOutcome {
        artifact,
        trials: trial_results,
    })
}

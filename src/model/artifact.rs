//! The persisted model bundle.
//!
//! The transform configuration is stored alongside the trained ensemble so
//! the feature order and encoding tables used at inference time are, by
//! construction, the ones captured at training time. The artifact is written
//! once, loaded read-only, and never mutated in place.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::pipeline::features::TransformConfig;
use crate::pipeline::schema::LoanRecord;
use crate::train::search::HyperParams;
use crate::train::TrainingMetrics;

/// Bumped when the on-disk layout changes incompatibly.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A single score for one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Default probability in [0, 1]
    pub probability: f64,
    /// Binary label at the artifact's decision threshold
    pub defaulted: bool,
}

/// Serialized trained classifier plus the feature metadata needed to apply
/// it consistently.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub crate_version: String,
    pub created_at: String,
    pub feature_names: Vec<String>,
    pub transform: TransformConfig,
    pub params: HyperParams,
    pub metrics: TrainingMetrics,
    pub threshold: f64,
    model: GBDT,
}

impl std::fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("format_version", &self.format_version)
            .field("crate_version", &self.crate_version)
            .field("created_at", &self.created_at)
            .field("feature_names", &self.feature_names)
            .field("transform", &self.transform)
            .field("params", &self.params)
            .field("metrics", &self.metrics)
            .field("threshold", &self.threshold)
            .field("model", &"<GBDT>")
            .finish()
    }
}

impl ModelArtifact {
    /// Assemble a freshly trained artifact.
    pub fn new(
        transform: TransformConfig,
        model: GBDT,
        params: HyperParams,
        metrics: TrainingMetrics,
        threshold: f64,
    ) -> Self {
        ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            feature_names: transform.feature_names().to_vec(),
            transform,
            params,
            metrics,
            threshold,
            model,
        }
    }

    /// Write the artifact as JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create artifact directory: {}", parent.display())
                })?;
            }
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create artifact file: {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("Failed to serialize artifact: {}", path.display()))?;

        Ok(())
    }

    /// Load an artifact from disk. Any failure here means the service cannot
    /// start, so everything maps to `ServiceUnavailable`.
    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        let file = File::open(path).map_err(|e| {
            ScoreError::ServiceUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;

        let artifact: ModelArtifact =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                ScoreError::ServiceUnavailable(format!("corrupt artifact {}: {}", path.display(), e))
            })?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ScoreError::ServiceUnavailable(format!(
                "artifact format version {} is not supported (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if artifact.feature_names != artifact.transform.feature_names() {
            return Err(ScoreError::ServiceUnavailable(
                "artifact feature names do not match its transform configuration".into(),
            ));
        }

        Ok(artifact)
    }

    /// Score one raw record: transform, run the ensemble, threshold.
    pub fn predict(&self, record: &LoanRecord) -> Result<Prediction, ScoreError> {
        let features = self.transform.transform(record)?;
        let probability = self.predict_features(&features);

        Ok(Prediction {
            probability,
            defaulted: probability >= self.threshold,
        })
    }

    /// Score an already-transformed feature vector.
    pub fn predict_features(&self, features: &[f64]) -> f64 {
        let rows: DataVec = vec![Data::new_test_data(
            features.iter().map(|v| *v as f32).collect(),
            None,
        )];
        let scores = self.model.predict(&rows);
        let raw = scores.first().copied().unwrap_or(0.5) as f64;
        raw.clamp(0.0, 1.0)
    }

    /// Score many records, aborting on the first invalid one.
    pub fn predict_all(&self, records: &[LoanRecord]) -> Result<Vec<Prediction>, ScoreError> {
        records.iter().map(|r| self.predict(r)).collect()
    }
}

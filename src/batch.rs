//! Batch inference: score a file of records into a file of predictions.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::model::ModelArtifact;
use crate::pipeline::loader::{extract_records, load_dataset, save_dataset, validate_schema};
use crate::utils::create_progress_bar;

/// Outcome of one batch run.
#[derive(Debug)]
pub struct BatchSummary {
    /// Rows scored (always equal to input rows on success)
    pub rows: usize,
    /// Rows at or above the decision threshold
    pub flagged: usize,
    pub elapsed: std::time::Duration,
}

/// Score every record in `input` with the artifact at `model_path`, writing
/// one output row per input row in input order. Aborts on the first
/// unrecoverable parse or validation error.
pub fn run_batch_scoring(input: &Path, output: &Path, model_path: &Path) -> Result<BatchSummary> {
    let started = Instant::now();

    let artifact = ModelArtifact::load(model_path)
        .with_context(|| format!("cannot score without a model ({})", model_path.display()))?;

    let df = load_dataset(input)?;
    validate_schema(&df, false)
        .with_context(|| format!("input file {} failed schema validation", input.display()))?;
    let records = extract_records(&df)
        .with_context(|| format!("input file {} has malformed rows", input.display()))?;

    let pb = create_progress_bar(records.len() as u64, "   Scoring");

    let mut loan_ids = Vec::with_capacity(records.len());
    let mut probabilities = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());

    for record in &records {
        let prediction = artifact
            .predict(record)
            .with_context(|| format!("failed to score loan_id {}", record.loan_id))?;
        loan_ids.push(record.loan_id);
        probabilities.push(prediction.probability);
        labels.push(prediction.defaulted);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let flagged = labels.iter().filter(|l| **l).count();

    let mut out = DataFrame::new(vec![
        Column::new("loan_id".into(), loan_ids),
        Column::new("probability".into(), probabilities),
        Column::new("defaulted".into(), labels),
    ])
    .context("failed to assemble output frame")?;

    save_dataset(&mut out, output)?;

    Ok(BatchSummary {
        rows: records.len(),
        flagged,
        elapsed: started.elapsed(),
    })
}

//! Seeded, stratified train/validation splitting.

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::ScoreError;

/// Split row indices into (train, validation), preserving class balance.
///
/// Shuffling is seeded so a given (targets, fraction, seed) triple always
/// produces the same split. Each class keeps at least one training row.
pub fn stratified_split(
    targets: &[i32],
    validation_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), ScoreError> {
    if !(0.0..1.0).contains(&validation_fraction) || validation_fraction <= 0.0 {
        return Err(ScoreError::Validation(format!(
            "validation fraction must be in (0, 1), got {}",
            validation_fraction
        )));
    }
    if targets.is_empty() {
        return Err(ScoreError::DataFormat("no rows to split".into()));
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut train_idx = Vec::new();
    let mut val_idx = Vec::new();

    for class in [0, 1] {
        let mut indices: Vec<usize> = targets
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == class)
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            continue;
        }

        indices.shuffle(&mut rng);

        let n_val = ((indices.len() as f64) * validation_fraction).floor() as usize;
        // Keep at least one row of each class on the training side
        let n_val = n_val.min(indices.len().saturating_sub(1));

        val_idx.extend_from_slice(&indices[..n_val]);
        train_idx.extend_from_slice(&indices[n_val..]);
    }

    if train_idx.is_empty() || val_idx.is_empty() {
        return Err(ScoreError::DataFormat(format!(
            "split produced an empty side ({} train / {} validation rows)",
            train_idx.len(),
            val_idx.len()
        )));
    }

    train_idx.sort_unstable();
    val_idx.sort_unstable();

    Ok((train_idx, val_idx))
}

/// Gather rows of `items` by index.
pub fn take<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

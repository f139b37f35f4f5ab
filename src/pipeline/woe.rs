//! Weight of Evidence (WoE) encoding for continuous credit-risk variables.
//!
//! Fitting creates equal-frequency pre-bins and greedily merges adjacent
//! pairs with minimum Information Value loss until the target bin count is
//! reached. Encoding maps a raw value to its bin's WoE; missing values take
//! a dedicated missing-bin WoE.

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Number of initial quantile pre-bins before merging
const PRE_BIN_COUNT: usize = 50;

/// Minimum non-missing samples required to fit an encoder
const MIN_FIT_SAMPLES: usize = 10;

/// Smoothing constant to avoid log(0) in WoE calculation (Laplace smoothing)
const SMOOTHING: f64 = 0.5;

/// A single bin with WoE statistics, used during fitting.
#[derive(Debug, Clone)]
struct WoeBin {
    /// Lower bound (inclusive)
    lower_bound: f64,
    /// Upper bound (exclusive, except for last bin)
    upper_bound: f64,
    /// Count of events (target = 1) in this bin
    events: f64,
    /// Count of non-events (target = 0) in this bin
    non_events: f64,
    /// Weight of Evidence for this bin
    woe: f64,
    /// Contribution to total IV from this bin
    iv_contribution: f64,
}

/// Fitted WoE encoder for one continuous feature.
///
/// Stores only finite interior cut points so the encoder round-trips through
/// JSON; bin `i` covers `[cuts[i-1], cuts[i])` with the first bin open below
/// and the last open above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WoeEncoder {
    /// Interior bin edges, ascending
    cuts: Vec<f64>,
    /// WoE per bin; one more entry than `cuts`
    woes: Vec<f64>,
    /// WoE assigned to missing values
    missing_woe: f64,
    /// Total Information Value of the fitted binning
    pub iv: f64,
}

impl WoeEncoder {
    /// Fit an encoder over training values and their binary targets.
    pub fn fit(
        values: &[Option<f64>],
        targets: &[i32],
        num_bins: usize,
    ) -> Result<Self, ScoreError> {
        if values.len() != targets.len() {
            return Err(ScoreError::DataFormat(format!(
                "value/target length mismatch: {} vs {}",
                values.len(),
                targets.len()
            )));
        }
        if num_bins == 0 {
            return Err(ScoreError::Validation("bin count must be positive".into()));
        }

        let mut pairs: Vec<(f64, i32)> = Vec::with_capacity(values.len());
        let mut missing_events = 0.0f64;
        let mut missing_non_events = 0.0f64;

        for (value, &target) in values.iter().zip(targets.iter()) {
            match value {
                Some(v) if v.is_finite() => pairs.push((*v, target)),
                _ => {
                    if target == 1 {
                        missing_events += 1.0;
                    } else {
                        missing_non_events += 1.0;
                    }
                }
            }
        }

        if pairs.len() < MIN_FIT_SAMPLES {
            return Err(ScoreError::DataFormat(format!(
                "insufficient non-missing samples to fit WoE bins: {}",
                pairs.len()
            )));
        }

        let total_events: f64 = pairs.iter().filter(|(_, t)| *t == 1).count() as f64 + missing_events;
        let total_non_events: f64 =
            pairs.iter().filter(|(_, t)| *t == 0).count() as f64 + missing_non_events;

        if total_events <= 0.0 || total_non_events <= 0.0 {
            return Err(ScoreError::DataFormat(
                "target has no variation (all 0s or all 1s)".into(),
            ));
        }

        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let pre_bins = create_quantile_prebins(&pairs, PRE_BIN_COUNT, total_events, total_non_events);
        let bins = greedy_merge_bins(pre_bins, num_bins, total_events, total_non_events);

        let (missing_woe, missing_iv) = if missing_events + missing_non_events > 0.0 {
            calculate_woe_iv(missing_events, missing_non_events, total_events, total_non_events)
        } else {
            (0.0, 0.0)
        };

        let iv = bins.iter().map(|b| b.iv_contribution).sum::<f64>() + missing_iv;

        // Interior cut points: every upper bound except the last (infinite) one
        let cuts: Vec<f64> = bins[..bins.len() - 1].iter().map(|b| b.upper_bound).collect();
        let woes: Vec<f64> = bins.iter().map(|b| b.woe).collect();

        Ok(WoeEncoder {
            cuts,
            woes,
            missing_woe,
            iv,
        })
    }

    /// Map a raw value to its bin's WoE. Missing or non-finite values take
    /// the missing-bin WoE.
    pub fn encode(&self, value: Option<f64>) -> f64 {
        match value {
            Some(v) if v.is_finite() => {
                let idx = self.cuts.partition_point(|cut| *cut <= v);
                self.woes[idx]
            }
            _ => self.missing_woe,
        }
    }

    /// Number of fitted bins (excluding the missing bin).
    pub fn num_bins(&self) -> usize {
        self.woes.len()
    }

    /// WoE assigned to missing values.
    pub fn missing_woe(&self) -> f64 {
        self.missing_woe
    }
}

/// Calculate WoE and IV contribution for a bin.
///
/// Uses the ln(%bad/%good) convention where WoE > 0 indicates higher risk.
fn calculate_woe_iv(
    events: f64,
    non_events: f64,
    total_events: f64,
    total_non_events: f64,
) -> (f64, f64) {
    // Laplace smoothing avoids log(0)
    let dist_events = (events + SMOOTHING) / (total_events + SMOOTHING);
    let dist_non_events = (non_events + SMOOTHING) / (total_non_events + SMOOTHING);

    let woe = (dist_events / dist_non_events).ln();
    let iv_contrib = (dist_events - dist_non_events) * woe;

    (woe, iv_contrib)
}

/// Create initial equal-frequency pre-bins over sorted (value, target) pairs.
fn create_quantile_prebins(
    sorted_pairs: &[(f64, i32)],
    num_prebins: usize,
    total_events: f64,
    total_non_events: f64,
) -> Vec<WoeBin> {
    let n = sorted_pairs.len();
    let bin_size = n.div_ceil(num_prebins);

    let mut bins = Vec::new();
    let mut start_idx = 0;

    while start_idx < n {
        let mut end_idx = (start_idx + bin_size).min(n);
        // Never split a run of identical values across two bins
        while end_idx < n && (sorted_pairs[end_idx].0 - sorted_pairs[end_idx - 1].0).abs() < 1e-12 {
            end_idx += 1;
        }

        let bin_pairs = &sorted_pairs[start_idx..end_idx];
        let lower = bin_pairs
            .first()
            .map(|(v, _)| *v)
            .unwrap_or(f64::NEG_INFINITY);
        let upper = if end_idx < n {
            sorted_pairs[end_idx].0
        } else {
            f64::INFINITY
        };

        let events = bin_pairs.iter().filter(|(_, t)| *t == 1).count() as f64;
        let non_events = bin_pairs.iter().filter(|(_, t)| *t == 0).count() as f64;

        let (woe, iv_contrib) = calculate_woe_iv(events, non_events, total_events, total_non_events);

        bins.push(WoeBin {
            lower_bound: lower,
            upper_bound: upper,
            events,
            non_events,
            woe,
            iv_contribution: iv_contrib,
        });

        start_idx = end_idx;
    }

    bins
}

/// Greedy merge bins to minimize IV loss until the target bin count is reached.
fn greedy_merge_bins(
    mut bins: Vec<WoeBin>,
    target_bins: usize,
    total_events: f64,
    total_non_events: f64,
) -> Vec<WoeBin> {
    while bins.len() > target_bins && bins.len() > 1 {
        let mut min_loss = f64::MAX;
        let mut merge_idx = 0;

        for i in 0..bins.len() - 1 {
            let merged = merge_two_bins(&bins[i], &bins[i + 1], total_events, total_non_events);
            let current_iv = bins[i].iv_contribution + bins[i + 1].iv_contribution;
            let loss = current_iv - merged.iv_contribution;

            if loss < min_loss {
                min_loss = loss;
                merge_idx = i;
            }
        }

        let merged = merge_two_bins(
            &bins[merge_idx],
            &bins[merge_idx + 1],
            total_events,
            total_non_events,
        );
        bins.remove(merge_idx + 1);
        bins[merge_idx] = merged;
    }

    bins
}

/// Merge two adjacent bins into one.
fn merge_two_bins(bin1: &WoeBin, bin2: &WoeBin, total_events: f64, total_non_events: f64) -> WoeBin {
    let events = bin1.events + bin2.events;
    let non_events = bin1.non_events + bin2.non_events;
    let (woe, iv_contrib) = calculate_woe_iv(events, non_events, total_events, total_non_events);

    WoeBin {
        lower_bound: bin1.lower_bound,
        upper_bound: bin2.upper_bound,
        events,
        non_events,
        woe,
        iv_contribution: iv_contrib,
    }
}

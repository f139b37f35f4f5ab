//! Feature engineering: raw loan records to model-ready numeric vectors.
//!
//! Fitting happens once over training data and captures every encoding table
//! (one-hot vocabularies, WoE bins, target-encoding rates, optional macro
//! table) into an immutable, serializable [`TransformConfig`]. Applying the
//! transform is a stateless per-record map, identical at train and serve
//! time because the configuration travels inside the model artifact.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::pipeline::schema::{LoanRecord, ONE_HOT_COLUMNS, WOE_COLUMNS};
use crate::pipeline::woe::WoeEncoder;

/// Designated bucket for rare and unseen categorical values.
pub const OTHER_CATEGORY: &str = "OTHER";

/// Default number of WoE bins after merging
pub const DEFAULT_WOE_BINS: usize = 10;

/// Default minimum samples per category before merging into OTHER
pub const DEFAULT_MIN_CATEGORY_SAMPLES: usize = 5;

/// Default pseudo-count pulling target-encoded rates toward the prior
pub const DEFAULT_TE_SMOOTHING: f64 = 0.25;

/// Knobs fixed at fit time and recorded in the transform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitOptions {
    /// Number of WoE bins after merging
    pub woe_bins: usize,
    /// Minimum samples per category before merging into OTHER
    pub min_category_samples: usize,
    /// Smoothing pseudo-count for target encoding
    pub te_smoothing: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            woe_bins: DEFAULT_WOE_BINS,
            min_category_samples: DEFAULT_MIN_CATEGORY_SAMPLES,
            te_smoothing: DEFAULT_TE_SMOOTHING,
        }
    }
}

/// One-hot vocabulary for a single categorical column.
///
/// The encoded width is `categories.len() + 1`: one indicator per retained
/// category plus a trailing OTHER indicator that captures rare and unseen
/// values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    fn fit(column: &str, values: &[&str], min_category_samples: usize) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in values {
            *counts.entry(*value).or_insert(0) += 1;
        }

        // A raw category literally named like the fallback keeps flowing into
        // the fallback column instead of claiming its own
        let mut categories: Vec<String> = counts
            .into_iter()
            .filter(|(cat, count)| *count >= min_category_samples && *cat != OTHER_CATEGORY)
            .map(|(cat, _)| cat.to_string())
            .collect();
        categories.sort();

        OneHotEncoder {
            column: column.to_string(),
            categories,
        }
    }

    fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|cat| format!("{}_{}", self.column, cat))
            .chain(std::iter::once(format!("{}_{}", self.column, OTHER_CATEGORY)))
            .collect()
    }

    fn encode_into(&self, value: &str, out: &mut Vec<f64>) {
        let hit = self.categories.iter().position(|cat| cat == value);
        for i in 0..self.categories.len() {
            out.push(if hit == Some(i) { 1.0 } else { 0.0 });
        }
        // Trailing OTHER indicator fires for anything not in the vocabulary
        out.push(if hit.is_none() { 1.0 } else { 0.0 });
    }
}

/// Smoothed mean-target encoding for a low-cardinality numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMeanEncoder {
    /// Distinct training value -> smoothed event rate, sorted by value
    levels: Vec<(f64, f64)>,
    /// Global event rate, the fallback for unseen values
    prior: f64,
}

impl TargetMeanEncoder {
    fn fit(values: &[f64], targets: &[i32], smoothing: f64) -> Self {
        let prior = if targets.is_empty() {
            0.0
        } else {
            targets.iter().filter(|t| **t == 1).count() as f64 / targets.len() as f64
        };

        let mut stats: BTreeMap<u64, (f64, f64, f64)> = BTreeMap::new(); // bits -> (value, events, count)
        for (value, &target) in values.iter().zip(targets.iter()) {
            let entry = stats.entry(value.to_bits()).or_insert((*value, 0.0, 0.0));
            if target == 1 {
                entry.1 += 1.0;
            }
            entry.2 += 1.0;
        }

        let mut levels: Vec<(f64, f64)> = stats
            .into_values()
            .map(|(value, events, count)| {
                (value, (events + smoothing * prior) / (count + smoothing))
            })
            .collect();
        levels.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        TargetMeanEncoder { levels, prior }
    }

    fn encode(&self, value: f64) -> f64 {
        self.levels
            .iter()
            .find(|(level, _)| (level - value).abs() < 1e-9)
            .map(|(_, rate)| *rate)
            .unwrap_or(self.prior)
    }

    /// Global event rate used for unseen values.
    pub fn prior(&self) -> f64 {
        self.prior
    }
}

/// Month-keyed macro-economic rates joined onto records by issue date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroTable {
    /// "YYYY-MM" -> (fed funds rate, unemployment rate)
    months: BTreeMap<String, (f64, f64)>,
    /// Fallbacks for months outside the table or records without a date
    mean_fed_rate: f64,
    mean_unemp_rate: f64,
}

impl MacroTable {
    /// Load a macro CSV with `date`, `fed_rate`, and `unemp_rate` columns.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let df = LazyCsvReader::new(path)
            .finish()
            .with_context(|| format!("Failed to load macro file: {}", path.display()))?
            .collect()
            .with_context(|| format!("Failed to read macro file: {}", path.display()))?;

        let dates = df
            .column("date")
            .and_then(|c| c.cast(&DataType::String))
            .context("macro file needs a 'date' column")?;
        let dates = dates.str().context("macro 'date' column")?.clone();
        let fed = df
            .column("fed_rate")
            .and_then(|c| c.cast(&DataType::Float64))
            .context("macro file needs a 'fed_rate' column")?;
        let fed = fed.f64().context("macro 'fed_rate' column")?.clone();
        let unemp = df
            .column("unemp_rate")
            .and_then(|c| c.cast(&DataType::Float64))
            .context("macro file needs an 'unemp_rate' column")?;
        let unemp = unemp.f64().context("macro 'unemp_rate' column")?.clone();

        let mut months = BTreeMap::new();
        for i in 0..df.height() {
            let (date, f, u) = match (dates.get(i), fed.get(i), unemp.get(i)) {
                (Some(date), Some(f), Some(u)) => (date, f, u),
                _ => anyhow::bail!("macro file has a null at row {}", i),
            };
            let month = month_key(date)
                .ok_or_else(|| anyhow::anyhow!("unparseable macro date '{}' at row {}", date, i))?;
            months.insert(month, (f, u));
        }

        if months.is_empty() {
            anyhow::bail!("macro file contains no rows");
        }

        let n = months.len() as f64;
        let mean_fed_rate = months.values().map(|(f, _)| f).sum::<f64>() / n;
        let mean_unemp_rate = months.values().map(|(_, u)| u).sum::<f64>() / n;

        Ok(MacroTable {
            months,
            mean_fed_rate,
            mean_unemp_rate,
        })
    }

    /// Rates for a record's issue date, falling back to table means when the
    /// date is absent, unparseable, or outside the table.
    fn lookup(&self, issue_d: Option<&str>) -> (f64, f64) {
        issue_d
            .and_then(month_key)
            .and_then(|month| self.months.get(&month).copied())
            .unwrap_or((self.mean_fed_rate, self.mean_unemp_rate))
    }
}

/// Reduce an ISO date (or bare "YYYY-MM") to its month key.
fn month_key(date: &str) -> Option<String> {
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(format!("{:04}-{:02}", d.year(), d.month()));
    }
    // Already a month key
    if let (Some(year), Some("-"), Some(month)) = (date.get(..4), date.get(4..5), date.get(5..)) {
        if year.parse::<u16>().is_ok() && month.len() == 2 && month.parse::<u8>().is_ok() {
            return Some(date.to_string());
        }
    }
    None
}

/// The complete fitted transform: every table needed to turn a raw record
/// into the model's feature vector, in a fixed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    feature_names: Vec<String>,
    one_hot: Vec<OneHotEncoder>,
    woe: Vec<(String, WoeEncoder)>,
    emp_length_te: TargetMeanEncoder,
    macro_table: Option<MacroTable>,
    options: FitOptions,
}

impl TransformConfig {
    /// Fit every encoder over the training records. Called once; the result
    /// is immutable and ships inside the model artifact.
    pub fn fit(
        records: &[LoanRecord],
        targets: &[i32],
        macro_table: Option<MacroTable>,
        options: FitOptions,
    ) -> Result<Self, ScoreError> {
        if records.is_empty() {
            return Err(ScoreError::DataFormat("no training records".into()));
        }
        if records.len() != targets.len() {
            return Err(ScoreError::DataFormat(format!(
                "record/target length mismatch: {} vs {}",
                records.len(),
                targets.len()
            )));
        }

        let one_hot: Vec<OneHotEncoder> = ONE_HOT_COLUMNS
            .iter()
            .map(|column| {
                let values: Vec<&str> = records.iter().map(|r| r.categorical_value(column)).collect();
                OneHotEncoder::fit(column, &values, options.min_category_samples)
            })
            .collect();

        let mut woe = Vec::with_capacity(WOE_COLUMNS.len());
        for column in WOE_COLUMNS.iter() {
            let values: Vec<Option<f64>> = records
                .iter()
                .map(|r| {
                    let v = r.continuous_value(column);
                    v.is_finite().then_some(v)
                })
                .collect();
            let encoder = WoeEncoder::fit(&values, targets, options.woe_bins)?;
            woe.push((column.to_string(), encoder));
        }

        let emp_values: Vec<f64> = records.iter().map(|r| r.emp_length).collect();
        let emp_length_te = TargetMeanEncoder::fit(&emp_values, targets, options.te_smoothing);

        let mut config = TransformConfig {
            feature_names: Vec::new(),
            one_hot,
            woe,
            emp_length_te,
            macro_table,
            options,
        };
        config.feature_names = config.build_feature_names();

        Ok(config)
    }

    fn build_feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = vec![
            "loan_amnt".into(),
            "annual_inc".into(),
            "delinq_2yrs".into(),
            "open_acc".into(),
            "pub_rec".into(),
            "total_acc".into(),
            "emp_length_te".into(),
        ];
        for encoder in &self.one_hot {
            names.extend(encoder.feature_names());
        }
        for (column, _) in &self.woe {
            names.push(format!("{}_woe", column));
        }
        names.push("loan_to_income".into());
        names.push("dti_emp_inter".into());
        if self.macro_table.is_some() {
            names.push("fed_rate".into());
            names.push("unemp_rate".into());
        }
        names
    }

    /// Engineered feature names, in the exact order `transform` emits them.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of features produced per record.
    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Pure per-record map: validated raw record -> feature vector aligned
    /// with `feature_names()`.
    pub fn transform(&self, record: &LoanRecord) -> Result<Vec<f64>, ScoreError> {
        record.validate()?;

        let mut out = Vec::with_capacity(self.num_features());

        out.push(record.loan_amnt);
        out.push(record.annual_inc);
        out.push(record.delinq_2yrs);
        out.push(record.open_acc);
        out.push(record.pub_rec);
        out.push(record.total_acc);
        out.push(self.emp_length_te.encode(record.emp_length));

        for encoder in &self.one_hot {
            encoder.encode_into(record.categorical_value(&encoder.column), &mut out);
        }

        for (column, encoder) in &self.woe {
            out.push(encoder.encode(Some(record.continuous_value(column))));
        }

        out.push(record.loan_amnt / (record.annual_inc + 1.0));
        out.push(record.dti * record.emp_length);

        if let Some(table) = &self.macro_table {
            let (fed, unemp) = table.lookup(record.issue_d.as_deref());
            out.push(fed);
            out.push(unemp);
        }

        debug_assert_eq!(out.len(), self.num_features());
        Ok(out)
    }

    /// Transform a slice of records, aborting on the first invalid one.
    pub fn transform_all(&self, records: &[LoanRecord]) -> Result<Vec<Vec<f64>>, ScoreError> {
        records.iter().map(|r| self.transform(r)).collect()
    }

    /// Fit options recorded at training time.
    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Fitted WoE encoder for a column, if one exists.
    pub fn woe_encoder(&self, column: &str) -> Option<&WoeEncoder> {
        self.woe
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, encoder)| encoder)
    }
}

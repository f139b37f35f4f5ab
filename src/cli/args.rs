//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lendscore - train, serve, and batch-score loan default risk models
#[derive(Parser, Debug)]
#[command(name = "lendscore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a model: engineer features, search hyperparameters, save an artifact
    Train {
        /// Input dataset (CSV or Parquet) with loan columns and a 'defaulted' target
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the model artifact (JSON)
        #[arg(short, long, default_value = "models/latest.json")]
        output: PathBuf,

        /// Number of random hyperparameter search trials
        #[arg(long, default_value = "40")]
        trials: usize,

        /// Fraction of rows held out for validation scoring
        #[arg(long, default_value = "0.2", value_parser = validate_fraction)]
        validation_fraction: f64,

        /// Seed for splitting and trial sampling
        #[arg(long, default_value = "2025")]
        seed: u64,

        /// Decision threshold recorded in the artifact
        #[arg(long, default_value = "0.5", value_parser = validate_fraction)]
        threshold: f64,

        /// Number of WoE bins for continuous risk variables
        #[arg(long, default_value = "10")]
        woe_bins: usize,

        /// Minimum samples per category before merging into OTHER
        #[arg(long, default_value = "5")]
        min_category_samples: usize,

        /// Optional macro-economic CSV (date, fed_rate, unemp_rate) joined by issue month
        #[arg(long)]
        macro_file: Option<PathBuf>,
    },

    /// Score a file of records with a trained artifact, one output row per input row
    Score {
        /// Input dataset (CSV or Parquet) with loan columns
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for predictions (CSV or Parquet, determined by extension)
        #[arg(short, long)]
        output: PathBuf,

        /// Path to the model artifact
        #[arg(short, long)]
        model: PathBuf,
    },

    /// Serve predictions over HTTP (POST /predict, GET /health, GET /metrics)
    Serve {
        /// Path to the model artifact
        #[arg(short, long)]
        model: PathBuf,

        /// Listen address
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: String,
    },

    /// Generate a synthetic loan-application dataset for demos and tests
    Synth {
        /// Output file (CSV or Parquet, determined by extension)
        #[arg(short, long)]
        output: PathBuf,

        /// Number of rows to generate
        #[arg(long, default_value = "10000")]
        rows: usize,

        /// RNG seed
        #[arg(long, default_value = "2025")]
        seed: u64,
    },
}

/// Validator for fraction-valued parameters
fn validate_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!("value must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}

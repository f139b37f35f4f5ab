//! Lendscore: Loan Default Risk CLI
//!
//! Subcommands: `train` a model artifact, `score` a file of records,
//! `serve` predictions over HTTP, and `synth` demo data.

mod batch;
mod cli;
mod error;
mod model;
mod pipeline;
mod report;
mod serve;
mod train;
mod utils;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use cli::{Cli, Commands};
use pipeline::features::{FitOptions, MacroTable};
use pipeline::{extract_records, extract_target, load_dataset, validate_schema};
use report::{display_trial_leaderboard, TrainingSummary};
use train::{train_model, SearchSpace, TrainOptions};
use utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_info,
    print_step_header, print_step_time, print_success, print_train_config,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            input,
            output,
            trials,
            validation_fraction,
            seed,
            threshold,
            woe_bins,
            min_category_samples,
            macro_file,
        } => run_train(
            &input,
            &output,
            trials,
            validation_fraction,
            seed,
            threshold,
            woe_bins,
            min_category_samples,
            macro_file.as_deref(),
        ),
        Commands::Score {
            input,
            output,
            model,
        } => run_score(&input, &output, &model),
        Commands::Serve { model, addr } => serve::run_server(&model, &addr),
        Commands::Synth { output, rows, seed } => cli::synth::run_synth(rows, &output, seed),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_train(
    input: &Path,
    output: &Path,
    trials: usize,
    validation_fraction: f64,
    seed: u64,
    threshold: f64,
    woe_bins: usize,
    min_category_samples: usize,
    macro_file: Option<&Path>,
) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_train_config(input, output, trials, validation_fraction, seed);

    // Step 1: Load and validate dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let df = load_dataset(input)?;
    validate_schema(&df, true)?;
    let records = extract_records(&df)?;
    let targets = extract_target(&df)?;
    finish_with_success(&spinner, "Dataset loaded");

    let event_rate =
        targets.iter().filter(|t| **t == 1).count() as f64 / targets.len().max(1) as f64;
    println!("\n    {} Dataset:", style("✧").cyan());
    println!("      Rows: {}", records.len());
    println!("      Default rate: {:.2}%", event_rate * 100.0);
    print_step_time(step_start.elapsed());

    let macro_table = match macro_file {
        Some(path) => {
            let table = MacroTable::from_csv(path)?;
            print_info("Macro-economic table loaded; fed_rate/unemp_rate features enabled");
            Some(table)
        }
        None => None,
    };

    // Step 2: Hyperparameter search + final fit
    print_step_header(2, "Train Model");
    let step_start = Instant::now();
    let options = TrainOptions {
        trials,
        validation_fraction,
        seed,
        threshold,
        fit: FitOptions {
            woe_bins,
            min_category_samples,
            ..FitOptions::default()
        },
        macro_table,
        space: SearchSpace::default(),
    };
    let outcome = train_model(&records, &targets, &options)?;
    print_success("Search complete, best parameters refit on all rows");
    print_step_time(step_start.elapsed());

    display_trial_leaderboard(&outcome.trials, 5);

    // Step 3: Persist artifact
    print_step_header(3, "Save Artifact");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing model artifact...");
    outcome.artifact.save(output)?;
    finish_with_success(&spinner, &format!("Saved to {}", output.display()));
    print_step_time(step_start.elapsed());

    let summary = TrainingSummary {
        rows: records.len(),
        features: outcome.artifact.feature_names.len(),
        metrics: outcome.artifact.metrics.clone(),
        artifact_path: output.to_path_buf(),
    };
    summary.display();

    print_completion("Training complete");
    Ok(())
}

fn run_score(input: &Path, output: &Path, model: &Path) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));

    let summary = batch::run_batch_scoring(input, output, model)?;

    print_success(&format!(
        "Scored {} record(s) in {:.2}s ({} flagged)",
        summary.rows,
        summary.elapsed.as_secs_f64(),
        summary.flagged
    ));
    print_completion(&format!("Predictions written to {}", output.display()));
    Ok(())
}

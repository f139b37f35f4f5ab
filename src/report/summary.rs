//! Training summary report generation

use std::path::PathBuf;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::train::{TrainingMetrics, TrialResult};

/// Summary of one training run, rendered after the artifact is saved.
#[derive(Debug)]
pub struct TrainingSummary {
    pub rows: usize,
    pub features: usize,
    pub metrics: TrainingMetrics,
    pub artifact_path: PathBuf,
}

impl TrainingSummary {
    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("TRAINING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("Rows"), Cell::new(self.rows)]);
        table.add_row(vec![Cell::new("Features"), Cell::new(self.features)]);
        table.add_row(vec![Cell::new("Trials"), Cell::new(self.metrics.trials)]);
        table.add_row(vec![
            Cell::new("Validation AUC"),
            Cell::new(format!("{:.4}", self.metrics.validation_auc))
                .fg(auc_color(self.metrics.validation_auc))
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("Train AUC"),
            Cell::new(format!("{:.4}", self.metrics.train_auc)),
        ]);
        table.add_row(vec![
            Cell::new("Train Gini"),
            Cell::new(format!("{:.4}", self.metrics.train_gini)),
        ]);
        table.add_row(vec![
            Cell::new("Train F1"),
            Cell::new(format!("{:.4}", self.metrics.train_f1)),
        ]);
        table.add_row(vec![
            Cell::new("Artifact"),
            Cell::new(self.artifact_path.display()),
        ]);

        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}

/// Render the top trials as a leaderboard.
pub fn display_trial_leaderboard(trials: &[TrialResult], top: usize) {
    if trials.is_empty() {
        return;
    }

    println!();
    println!(
        "    {} {}",
        style("🏁").cyan(),
        style("TOP TRIALS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Validation AUC").add_attribute(Attribute::Bold),
        Cell::new("Parameters").add_attribute(Attribute::Bold),
    ]);

    for result in trials.iter().take(top) {
        table.add_row(vec![
            Cell::new(result.trial),
            Cell::new(format!("{:.4}", result.validation_auc)).fg(auc_color(result.validation_auc)),
            Cell::new(result.params.to_string()),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn auc_color(auc: f64) -> Color {
    if auc >= 0.75 {
        Color::Green
    } else if auc >= 0.6 {
        Color::Yellow
    } else {
        Color::Red
    }
}

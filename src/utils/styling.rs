//! Terminal styling utilities for the CLI

use console::style;
use std::path::Path;
use std::time::Duration;

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("lendscore").cyan().bold(),
        style("· loan default risk scoring").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print the training configuration card
pub fn print_train_config(
    input: &Path,
    output: &Path,
    trials: usize,
    validation_fraction: f64,
    seed: u64,
) {
    println!("    {} Configuration", style("⚙").cyan().bold());
    println!("      Input:      {}", style(input.display()).dim());
    println!("      Artifact:   {}", style(output.display()).dim());
    println!(
        "      Trials:     {}",
        style(trials).yellow()
    );
    println!(
        "      Validation: {}",
        style(format!("{:.0}%", validation_fraction * 100.0)).yellow()
    );
    println!("      Seed:       {}", style(seed).yellow());
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", style("ℹ").cyan(), message);
}

/// Print elapsed time for a step
pub fn print_step_time(elapsed: Duration) {
    println!(
        "    {}",
        style(format!("took {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion(message: &str) {
    println!();
    println!("    {} {}", style("➜").green(), style(message).green().bold());
    println!();
}

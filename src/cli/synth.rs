//! Synthetic loan-application data generation.
//!
//! Produces a realistic dataset for demos, tests, and CI without touching
//! proprietary banking data. The target is drawn from a latent default
//! probability driven by DTI, employment length, revolving utilization, and
//! loan amount, so trained models have real signal to find.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::pipeline::loader::save_dataset;

const TERMS: [&str; 2] = [" 36 months", " 60 months"];
const HOME_OWNERSHIP: [&str; 4] = ["RENT", "OWN", "MORTGAGE", "OTHER"];
const PURPOSES: [&str; 4] = [
    "debt_consolidation",
    "credit_card",
    "home_improvement",
    "other",
];

/// Generate `rows` synthetic loan applications and write them to `output`.
pub fn run_synth(rows: usize, output: &Path, seed: u64) -> Result<()> {
    if rows == 0 {
        anyhow::bail!("row count must be positive");
    }

    let mut rng = StdRng::seed_from_u64(seed);

    let mut loan_id = Vec::with_capacity(rows);
    let mut loan_amnt = Vec::with_capacity(rows);
    let mut term = Vec::with_capacity(rows);
    let mut emp_length = Vec::with_capacity(rows);
    let mut home_ownership = Vec::with_capacity(rows);
    let mut annual_inc = Vec::with_capacity(rows);
    let mut purpose = Vec::with_capacity(rows);
    let mut dti = Vec::with_capacity(rows);
    let mut delinq_2yrs = Vec::with_capacity(rows);
    let mut open_acc = Vec::with_capacity(rows);
    let mut pub_rec = Vec::with_capacity(rows);
    let mut revol_util = Vec::with_capacity(rows);
    let mut total_acc = Vec::with_capacity(rows);
    let mut issue_d = Vec::with_capacity(rows);
    let mut defaulted = Vec::with_capacity(rows);

    for i in 0..rows {
        let amount = normal(&mut rng, 15_000.0, 8_000.0).clamp(1_000.0, 60_000.0).round();
        let years = rng.gen_range(0..=10) as f64;
        let income = normal(&mut rng, 82_000.0, 37_000.0)
            .clamp(15_000.0, 250_000.0)
            .round();
        let dti_value = beta(&mut rng, 2, 20) * 40.0;
        let util = beta(&mut rng, 2, 5) * 100.0;

        loan_id.push(i as i64 + 1);
        loan_amnt.push(amount);
        term.push(if rng.gen::<f64>() < 0.7 { TERMS[0] } else { TERMS[1] });
        emp_length.push(years);
        home_ownership.push(weighted_choice(
            &mut rng,
            &HOME_OWNERSHIP,
            &[0.4, 0.1, 0.45, 0.05],
        ));
        annual_inc.push(income);
        purpose.push(PURPOSES[rng.gen_range(0..PURPOSES.len())]);
        dti.push(dti_value);
        delinq_2yrs.push(poisson(&mut rng, 0.15) as f64);
        open_acc.push(poisson(&mut rng, 11.0) as f64);
        pub_rec.push(poisson(&mut rng, 0.25) as f64);
        revol_util.push(util);
        total_acc.push(poisson(&mut rng, 27.0) as f64);
        issue_d.push(random_date(&mut rng));

        // Latent default probability, not directly observed
        let mut prob = 0.06;
        if dti_value > 25.0 {
            prob += 0.15;
        }
        if years < 1.0 {
            prob += 0.10;
        }
        if util > 80.0 {
            prob += 0.05;
        }
        if amount > 40_000.0 {
            prob += 0.04;
        }
        defaulted.push(if rng.gen::<f64>() < prob { 1i32 } else { 0i32 });
    }

    let mut df = DataFrame::new(vec![
        Column::new("loan_id".into(), loan_id),
        Column::new("loan_amnt".into(), loan_amnt),
        Column::new("term".into(), term),
        Column::new("emp_length".into(), emp_length),
        Column::new("home_ownership".into(), home_ownership),
        Column::new("annual_inc".into(), annual_inc),
        Column::new("purpose".into(), purpose),
        Column::new("dti".into(), dti),
        Column::new("delinq_2yrs".into(), delinq_2yrs),
        Column::new("open_acc".into(), open_acc),
        Column::new("pub_rec".into(), pub_rec),
        Column::new("revol_util".into(), revol_util),
        Column::new("total_acc".into(), total_acc),
        Column::new("issue_d".into(), issue_d),
        Column::new("defaulted".into(), defaulted),
    ])
    .context("failed to assemble synthetic frame")?;

    save_dataset(&mut df, output)?;

    println!(
        "    {} Wrote {} synthetic rows to {}",
        style("✓").green().bold(),
        style(rows).yellow(),
        style(output.display()).dim()
    );

    Ok(())
}

/// Standard normal via Box-Muller, scaled to (mean, std).
fn normal(rng: &mut StdRng, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std * z
}

/// Poisson via Knuth's product-of-uniforms method.
fn poisson(rng: &mut StdRng, lambda: f64) -> u64 {
    let threshold = (-lambda).exp();
    let mut k = 0u64;
    let mut product = 1.0f64;
    loop {
        product *= rng.gen::<f64>();
        if product <= threshold {
            return k;
        }
        k += 1;
    }
}

/// Beta(a, b) for integer shapes via ratios of Erlang draws.
fn beta(rng: &mut StdRng, a: u32, b: u32) -> f64 {
    let ga = erlang(rng, a);
    let gb = erlang(rng, b);
    ga / (ga + gb)
}

/// Erlang(shape, 1): sum of `shape` unit exponentials.
fn erlang(rng: &mut StdRng, shape: u32) -> f64 {
    let mut product = 1.0f64;
    for _ in 0..shape {
        product *= rng.gen_range(f64::MIN_POSITIVE..1.0);
    }
    -product.ln()
}

fn weighted_choice<'a>(rng: &mut StdRng, choices: &[&'a str], weights: &[f64]) -> &'a str {
    let draw: f64 = rng.gen::<f64>();
    let mut cumulative = 0.0;
    for (choice, weight) in choices.iter().zip(weights.iter()) {
        cumulative += weight;
        if draw < cumulative {
            return choice;
        }
    }
    choices[choices.len() - 1]
}

/// Random ISO date between 2016-01-01 and 2020-12-28.
fn random_date(rng: &mut StdRng) -> String {
    let year = rng.gen_range(2016..=2020);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

//! Shared test utilities and fixture generators

use std::path::PathBuf;

use polars::prelude::*;
use tempfile::TempDir;

use lendscore::model::ModelArtifact;
use lendscore::pipeline::features::FitOptions;
use lendscore::pipeline::schema::LoanRecord;
use lendscore::train::{train_model, SearchSpace, TrainOptions};

/// Build one well-formed loan record; `i` varies the fields deterministically.
pub fn sample_record(i: usize) -> LoanRecord {
    let terms = [" 36 months", " 60 months"];
    let homes = ["RENT", "OWN", "MORTGAGE"];
    let purposes = ["debt_consolidation", "credit_card", "home_improvement"];

    LoanRecord {
        loan_id: i as i64 + 1,
        loan_amnt: 5_000.0 + (i % 20) as f64 * 2_000.0,
        term: terms[i % 2].to_string(),
        emp_length: (i % 11) as f64,
        home_ownership: homes[i % 3].to_string(),
        annual_inc: 40_000.0 + (i % 10) as f64 * 8_000.0,
        purpose: purposes[i % 3].to_string(),
        dti: 5.0 + (i % 30) as f64,
        delinq_2yrs: (i % 3) as f64,
        open_acc: 5.0 + (i % 12) as f64,
        pub_rec: (i % 2) as f64,
        revol_util: (i * 7 % 100) as f64,
        total_acc: 10.0 + (i % 25) as f64,
        issue_d: Some(format!("2018-{:02}-15", i % 12 + 1)),
    }
}

pub fn sample_records(n: usize) -> Vec<LoanRecord> {
    (0..n).map(sample_record).collect()
}

/// Records plus a target that tracks DTI closely, so a trained model has a
/// clean ranking signal to recover.
pub fn separable_dataset(n: usize) -> (Vec<LoanRecord>, Vec<i32>) {
    let records = sample_records(n);
    let targets = records
        .iter()
        .map(|r| if r.dti > 19.0 { 1 } else { 0 })
        .collect();
    (records, targets)
}

/// Assemble records (and optionally targets) into the on-disk frame layout.
pub fn loan_dataframe(records: &[LoanRecord], targets: Option<&[i32]>) -> DataFrame {
    let mut columns = vec![
        Column::new(
            "loan_id".into(),
            records.iter().map(|r| r.loan_id).collect::<Vec<_>>(),
        ),
        Column::new(
            "loan_amnt".into(),
            records.iter().map(|r| r.loan_amnt).collect::<Vec<_>>(),
        ),
        Column::new(
            "term".into(),
            records.iter().map(|r| r.term.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "emp_length".into(),
            records.iter().map(|r| r.emp_length).collect::<Vec<_>>(),
        ),
        Column::new(
            "home_ownership".into(),
            records
                .iter()
                .map(|r| r.home_ownership.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "annual_inc".into(),
            records.iter().map(|r| r.annual_inc).collect::<Vec<_>>(),
        ),
        Column::new(
            "purpose".into(),
            records.iter().map(|r| r.purpose.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "dti".into(),
            records.iter().map(|r| r.dti).collect::<Vec<_>>(),
        ),
        Column::new(
            "delinq_2yrs".into(),
            records.iter().map(|r| r.delinq_2yrs).collect::<Vec<_>>(),
        ),
        Column::new(
            "open_acc".into(),
            records.iter().map(|r| r.open_acc).collect::<Vec<_>>(),
        ),
        Column::new(
            "pub_rec".into(),
            records.iter().map(|r| r.pub_rec).collect::<Vec<_>>(),
        ),
        Column::new(
            "revol_util".into(),
            records.iter().map(|r| r.revol_util).collect::<Vec<_>>(),
        ),
        Column::new(
            "total_acc".into(),
            records.iter().map(|r| r.total_acc).collect::<Vec<_>>(),
        ),
        Column::new(
            "issue_d".into(),
            records
                .iter()
                .map(|r| r.issue_d.clone().unwrap_or_default())
                .collect::<Vec<_>>(),
        ),
    ];

    if let Some(targets) = targets {
        columns.push(Column::new("defaulted".into(), targets.to_vec()));
    }

    DataFrame::new(columns).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Training options small enough for test runs.
pub fn tiny_train_options() -> TrainOptions {
    TrainOptions {
        trials: 3,
        validation_fraction: 0.25,
        seed: 7,
        threshold: 0.5,
        fit: FitOptions {
            woe_bins: 4,
            min_category_samples: 2,
            ..FitOptions::default()
        },
        macro_table: None,
        space: SearchSpace {
            iterations: (10, 30),
            max_depth: (2, 4),
            shrinkage: (0.05, 0.3),
            min_leaf_size: (2, 10),
            // Subsampling draws from the boosting library's own RNG; pin the
            // ratios so test runs are reproducible
            data_sample_ratio: (1.0, 1.0),
            feature_sample_ratio: (1.0, 1.0),
        },
    }
}

/// Train a small artifact over a separable dataset.
pub fn train_tiny_artifact(rows: usize) -> (ModelArtifact, Vec<LoanRecord>, Vec<i32>) {
    let (records, targets) = separable_dataset(rows);
    let outcome = train_model(&records, &targets, &tiny_train_options()).unwrap();
    (outcome.artifact, records, targets)
}

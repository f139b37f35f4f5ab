//! Dataset loader for CSV and Parquet files with loan-schema validation.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use crate::error::ScoreError;
use crate::pipeline::schema::{LoanRecord, REQUIRED_COLUMNS, TARGET_COLUMN};

/// Load a dataset from a file (CSV or Parquet based on extension).
pub fn load_dataset(path: &Path) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10_000))
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    let df = lf
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;

    Ok(df)
}

/// Save a dataset to a file (CSV or Parquet based on extension).
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}

/// Verify that all required loan-application columns are present.
///
/// When `require_target` is set, the binary target column must be present as
/// well (training input); batch scoring input does not need it.
pub fn validate_schema(df: &DataFrame, require_target: bool) -> Result<(), ScoreError> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.iter().any(|have| have == *c))
        .copied()
        .collect();

    if require_target && !columns.iter().any(|have| have == TARGET_COLUMN) {
        missing.push(TARGET_COLUMN);
    }

    if !missing.is_empty() {
        return Err(ScoreError::DataFormat(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Extract typed loan records from a validated DataFrame, in row order.
///
/// A null in any required field aborts with the offending row index; there
/// are no partial-failure semantics.
pub fn extract_records(df: &DataFrame) -> Result<Vec<LoanRecord>, ScoreError> {
    let loan_id = int_column(df, "loan_id")?;
    let loan_amnt = float_column(df, "loan_amnt")?;
    let term = string_column(df, "term")?;
    let emp_length = float_column(df, "emp_length")?;
    let home_ownership = string_column(df, "home_ownership")?;
    let annual_inc = float_column(df, "annual_inc")?;
    let purpose = string_column(df, "purpose")?;
    let dti = float_column(df, "dti")?;
    let delinq_2yrs = float_column(df, "delinq_2yrs")?;
    let open_acc = float_column(df, "open_acc")?;
    let pub_rec = float_column(df, "pub_rec")?;
    let revol_util = float_column(df, "revol_util")?;
    let total_acc = float_column(df, "total_acc")?;

    // issue_d is optional at the schema level
    let issue_d = if df.get_column_names().iter().any(|c| c.as_str() == "issue_d") {
        Some(string_column(df, "issue_d")?)
    } else {
        None
    };

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let record = LoanRecord {
            loan_id: required(loan_id.get(i), "loan_id", i)?,
            loan_amnt: required(loan_amnt.get(i), "loan_amnt", i)?,
            term: required(term.get(i), "term", i)?.to_string(),
            emp_length: required(emp_length.get(i), "emp_length", i)?,
            home_ownership: required(home_ownership.get(i), "home_ownership", i)?.to_string(),
            annual_inc: required(annual_inc.get(i), "annual_inc", i)?,
            purpose: required(purpose.get(i), "purpose", i)?.to_string(),
            dti: required(dti.get(i), "dti", i)?,
            delinq_2yrs: required(delinq_2yrs.get(i), "delinq_2yrs", i)?,
            open_acc: required(open_acc.get(i), "open_acc", i)?,
            pub_rec: required(pub_rec.get(i), "pub_rec", i)?,
            revol_util: required(revol_util.get(i), "revol_util", i)?,
            total_acc: required(total_acc.get(i), "total_acc", i)?,
            issue_d: issue_d
                .as_ref()
                .and_then(|col| col.get(i))
                .map(|s| s.to_string()),
        };
        records.push(record);
    }

    Ok(records)
}

/// Extract and validate the binary target column.
///
/// Handles integer and float encodings of 0/1 (CSV inference may produce
/// either); anything else is a data format error.
pub fn extract_target(df: &DataFrame) -> Result<Vec<i32>, ScoreError> {
    let col = df
        .column(TARGET_COLUMN)
        .map_err(|_| ScoreError::DataFormat(format!("target column '{}' not found", TARGET_COLUMN)))?;

    if col.len() == 0 {
        return Err(ScoreError::DataFormat(format!(
            "target column '{}' is empty",
            TARGET_COLUMN
        )));
    }

    let float_col = col.cast(&DataType::Float64).map_err(|e| {
        ScoreError::DataFormat(format!("target column '{}' is not numeric: {}", TARGET_COLUMN, e))
    })?;
    let values = float_col
        .f64()
        .map_err(|e| ScoreError::DataFormat(format!("target column '{}': {}", TARGET_COLUMN, e)))?;

    const TOLERANCE: f64 = 1e-9;
    let mut targets = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) if (v - 0.0).abs() < TOLERANCE => targets.push(0),
            Some(v) if (v - 1.0).abs() < TOLERANCE => targets.push(1),
            Some(v) => {
                return Err(ScoreError::DataFormat(format!(
                    "target column '{}' must be binary (0/1); row {} has {}",
                    TARGET_COLUMN, i, v
                )))
            }
            None => {
                return Err(ScoreError::DataFormat(format!(
                    "target column '{}' has a null at row {}",
                    TARGET_COLUMN, i
                )))
            }
        }
    }

    Ok(targets)
}

fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T, ScoreError> {
    value.ok_or_else(|| {
        ScoreError::DataFormat(format!("null value in column '{}' at row {}", column, row))
    })
}

fn float_column(df: &DataFrame, name: &str) -> Result<Float64Chunked, ScoreError> {
    let col = df
        .column(name)
        .map_err(|_| ScoreError::DataFormat(format!("missing required column '{}'", name)))?;
    let cast = col
        .cast(&DataType::Float64)
        .map_err(|e| ScoreError::DataFormat(format!("column '{}' is not numeric: {}", name, e)))?;
    Ok(cast
        .f64()
        .map_err(|e| ScoreError::DataFormat(format!("column '{}': {}", name, e)))?
        .clone())
}

fn int_column(df: &DataFrame, name: &str) -> Result<Int64Chunked, ScoreError> {
    let col = df
        .column(name)
        .map_err(|_| ScoreError::DataFormat(format!("missing required column '{}'", name)))?;
    let cast = col
        .cast(&DataType::Int64)
        .map_err(|e| ScoreError::DataFormat(format!("column '{}' is not an integer: {}", name, e)))?;
    Ok(cast
        .i64()
        .map_err(|e| ScoreError::DataFormat(format!("column '{}': {}", name, e)))?
        .clone())
}

fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked, ScoreError> {
    let col = df
        .column(name)
        .map_err(|_| ScoreError::DataFormat(format!("missing required column '{}'", name)))?;
    let cast = col
        .cast(&DataType::String)
        .map_err(|e| ScoreError::DataFormat(format!("column '{}' is not a string: {}", name, e)))?;
    Ok(cast
        .str()
        .map_err(|e| ScoreError::DataFormat(format!("column '{}': {}", name, e)))?
        .clone())
}

//! Unit tests for dataset loading and schema validation

use std::io::Write;

use lendscore::error::ScoreError;
use lendscore::pipeline::{
    extract_records, extract_target, load_dataset, validate_schema,
};
use polars::prelude::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_load_csv_roundtrip() {
    let (records, targets) = common::separable_dataset(12);
    let mut df = common::loan_dataframe(&records, Some(&targets));
    let (_tmp, csv_path) = common::create_temp_csv(&mut df);

    let loaded = load_dataset(&csv_path).unwrap();

    assert_eq!(loaded.height(), 12);
    validate_schema(&loaded, true).unwrap();

    let loaded_records = extract_records(&loaded).unwrap();
    assert_eq!(loaded_records.len(), 12);
    assert_eq!(loaded_records[0].loan_id, records[0].loan_id);
    assert_eq!(loaded_records[0].term, records[0].term);

    let loaded_targets = extract_target(&loaded).unwrap();
    assert_eq!(loaded_targets, targets);
}

#[test]
fn test_load_parquet_file() {
    let (records, targets) = common::separable_dataset(8);
    let mut df = common::loan_dataframe(&records, Some(&targets));

    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");
    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();

    let loaded = load_dataset(&parquet_path).unwrap();
    assert_eq!(loaded.height(), 8);
    validate_schema(&loaded, true).unwrap();
}

#[test]
fn test_missing_required_column_is_data_format_error() {
    let (records, targets) = common::separable_dataset(5);
    let df = common::loan_dataframe(&records, Some(&targets));
    let df = df.drop("dti").unwrap();

    let err = validate_schema(&df, true).unwrap_err();
    match err {
        ScoreError::DataFormat(msg) => assert!(msg.contains("dti"), "message was: {}", msg),
        other => panic!("expected DataFormat error, got {:?}", other),
    }
}

#[test]
fn test_missing_target_only_flagged_when_required() {
    let (records, _) = common::separable_dataset(5);
    let df = common::loan_dataframe(&records, None);

    validate_schema(&df, false).unwrap();
    assert!(validate_schema(&df, true).is_err());
}

#[test]
fn test_unsupported_format() {
    let temp_dir = TempDir::new().unwrap();
    let bad_path = temp_dir.path().join("test.xlsx");
    std::fs::File::create(&bad_path).unwrap();

    let result = load_dataset(&bad_path);

    assert!(result.is_err(), "Unsupported format should return error");
    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("Unsupported"),
        "Error message should mention unsupported format: {}",
        err_msg
    );
}

#[test]
fn test_nonexistent_file() {
    let path = std::path::Path::new("/nonexistent/path/to/file.csv");
    assert!(load_dataset(path).is_err());
}

#[test]
fn test_null_in_required_field_names_row() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("nulls.csv");

    let (records, targets) = common::separable_dataset(3);
    let mut df = common::loan_dataframe(&records, Some(&targets));
    // Blank out one dti cell by writing the CSV manually
    let mut file = std::fs::File::create(&csv_path).unwrap();
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer).finish(&mut df).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let mut lines: Vec<String> = text.lines().map(|l| l.to_string()).collect();
    // Row 2, dti is the 8th column (0-based index 7)
    let mut fields: Vec<&str> = lines[2].split(',').collect();
    fields[7] = "";
    lines[2] = fields.join(",");
    writeln!(file, "{}", lines.join("\n")).unwrap();

    let loaded = load_dataset(&csv_path).unwrap();
    let err = extract_records(&loaded).unwrap_err();
    match err {
        ScoreError::DataFormat(msg) => {
            assert!(msg.contains("dti"), "message was: {}", msg);
            assert!(msg.contains("row 1"), "message was: {}", msg);
        }
        other => panic!("expected DataFormat error, got {:?}", other),
    }
}

#[test]
fn test_non_binary_target_rejected() {
    let (records, _) = common::separable_dataset(4);
    let targets = vec![0, 1, 2, 1];
    let df = common::loan_dataframe(&records, Some(&targets));

    let err = extract_target(&df).unwrap_err();
    match err {
        ScoreError::DataFormat(msg) => assert!(msg.contains("binary"), "message was: {}", msg),
        other => panic!("expected DataFormat error, got {:?}", other),
    }
}

#[test]
fn test_float_encoded_target_accepted() {
    let (records, _) = common::separable_dataset(4);
    let mut df = common::loan_dataframe(&records, None);
    df.with_column(Column::new("defaulted".into(), vec![0.0f64, 1.0, 0.0, 1.0]))
        .unwrap();

    let targets = extract_target(&df).unwrap();
    assert_eq!(targets, vec![0, 1, 0, 1]);
}

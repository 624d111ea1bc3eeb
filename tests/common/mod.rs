//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

/// The three-row example table: two identical rows and one distinct.
///
/// After deduplication it holds AGE [25, 40], SEX [M, F], default [0, 1].
pub fn create_small_credit_dataframe() -> DataFrame {
    df! {
        "AGE" => [25i64, 40, 25],
        "SEX" => ["M", "F", "M"],
        "default" => [0i64, 1, 0],
    }
    .unwrap()
}

/// Synthetic credit-default table shaped like the UCI dataset.
///
/// - `ID`: unique row identifier
/// - `LIMIT_BAL`, `AGE`, `PAY_0`, `BILL_AMT1`: numeric features
/// - `SEX`, `EDUCATION`: string categoricals
/// - `default`: 0/1 label, driven mostly by `PAY_0`
pub fn create_credit_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let educations = ["graduate", "university", "high_school", "other"];

    let mut id = Vec::with_capacity(rows);
    let mut limit = Vec::with_capacity(rows);
    let mut age = Vec::with_capacity(rows);
    let mut pay = Vec::with_capacity(rows);
    let mut bill = Vec::with_capacity(rows);
    let mut sex = Vec::with_capacity(rows);
    let mut education = Vec::with_capacity(rows);
    let mut default = Vec::with_capacity(rows);

    for i in 0..rows {
        let pay_0: i64 = rng.gen_range(-2..=4);
        let limit_bal = rng.gen_range(10..=500) as f64 * 1000.0;
        let score = 1.2 * pay_0 as f64 - limit_bal / 250_000.0 + rng.gen_range(-1.5..1.5);

        id.push(i as i64 + 1);
        limit.push(limit_bal);
        age.push(rng.gen_range(21i64..=70));
        pay.push(pay_0);
        bill.push(rng.gen_range(0.0..100_000.0f64));
        sex.push(if rng.gen_bool(0.6) { "F" } else { "M" });
        education.push(educations[rng.gen_range(0..educations.len())]);
        default.push(if score > 1.0 { 1i64 } else { 0 });
    }

    df! {
        "ID" => id,
        "LIMIT_BAL" => limit,
        "SEX" => sex,
        "EDUCATION" => education,
        "AGE" => age,
        "PAY_0" => pay,
        "BILL_AMT1" => bill,
        "default" => default,
    }
    .unwrap()
}

/// Replace one float cell with NaN
pub fn with_nan_at(df: &DataFrame, column: &str, row: usize) -> DataFrame {
    let mut values: Vec<Option<f64>> = df
        .column(column)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    values[row] = Some(f64::NAN);

    let mut out = df.clone();
    out.with_column(Column::new(column.into(), values)).unwrap();
    out
}

/// Credit table whose target is "yes"/"no" text instead of 0/1
pub fn create_text_target_dataframe() -> DataFrame {
    df! {
        "AGE" => [25i64, 40, 33, 51, 29, 45, 38, 60, 22, 35],
        "SEX" => ["M", "F", "F", "M", "F", "M", "F", "M", "F", "M"],
        "status" => ["no", "yes", "no", "yes", "no", "yes", "no", "yes", "no", "maybe"],
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(
        rows, expected_rows,
        "Row count mismatch: expected {}, got {}",
        expected_rows, rows
    );
    assert_eq!(
        cols, expected_cols,
        "Column count mismatch: expected {}, got {}",
        expected_cols, cols
    );
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// Assert two floats agree within `tol`
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "Expected {} ± {}, got {}",
        expected,
        tol,
        actual
    );
}

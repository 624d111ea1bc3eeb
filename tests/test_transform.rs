//! Tests for the fit/apply column transform

use creditlens::pipeline::*;
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_small_table_end_to_end() {
    let df = create_small_credit_dataframe();

    let (cleaned, summary) = clean(&df, &CleanOptions::default()).unwrap();
    assert_eq!(summary.duplicates_removed, 1);
    assert_eq!(cleaned.height(), 2);

    let split = split_features_target(&cleaned, "default", None).unwrap();
    assert_eq!(split.partition.numeric, vec!["AGE"]);
    assert_eq!(split.partition.categorical, vec!["SEX"]);
    assert_eq!(split.target, vec![0, 1]);

    let transform = FittedTransform::fit(&split.features, &split.partition).unwrap();
    let age = &transform.scaler().params()[0];
    assert_close(age.mean, 32.5, 1e-12);
    assert_close(age.std, 7.5, 1e-12);

    let vocab = &transform.encoder().vocabularies()[0];
    assert_eq!(vocab.encode(Some("M")), vec![1.0, 0.0]);
    assert_eq!(vocab.encode(Some("F")), vec![0.0, 1.0]);

    let out = transform.apply(&split.features).unwrap();
    assert_close(out.matrix[(0, 0)], -1.0, 1e-12);
    assert_close(out.matrix[(1, 0)], 1.0, 1e-12);
    assert_eq!(transform.feature_names(), vec!["AGE", "SEX_M", "SEX_F"]);
}

#[test]
fn test_scaled_training_columns_have_zero_mean_unit_variance() {
    let df = create_credit_dataframe(200, 11);
    let split = split_features_target(&df, "default", None).unwrap();
    let transform = FittedTransform::fit(&split.features, &split.partition).unwrap();
    let out = transform.apply(&split.features).unwrap();

    let n = out.matrix.nrows() as f64;
    for j in 0..transform.scaler().len() {
        let values: Vec<f64> = (0..out.matrix.nrows()).map(|i| out.matrix[(i, j)]).collect();
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert_close(mean, 0.0, 1e-9);
        assert_close(var, 1.0, 1e-9);
    }
}

#[test]
fn test_scaler_inverse_recovers_values() {
    let df = create_credit_dataframe(50, 2);
    let columns = vec!["LIMIT_BAL".to_string(), "AGE".to_string()];
    let scaler = FittedScaler::fit(&df, &columns).unwrap();

    for (index, name) in columns.iter().enumerate() {
        let scaled = scaler.apply_column(&df, index).unwrap();
        let restored = scaler.inverse_column(index, &scaled);
        let original: Vec<f64> = df
            .column(name)
            .unwrap()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        for (r, o) in restored.iter().zip(&original) {
            assert_close(*r, *o, 1e-6);
        }
    }
}

#[test]
fn test_one_hot_rows_have_at_most_one_hot() {
    let train = df! {
        "EDUCATION" => ["grad", "uni", "hs", "grad"],
    }
    .unwrap();
    let test = df! {
        "EDUCATION" => [Some("uni"), Some("phd"), None, Some("hs")],
    }
    .unwrap();
    let partition = ColumnPartition {
        numeric: vec![],
        categorical: vec!["EDUCATION".to_string()],
    };

    let transform = FittedTransform::fit(&train, &partition).unwrap();
    let out = transform.apply(&test).unwrap();

    let row_sums: Vec<f64> = (0..out.matrix.nrows())
        .map(|i| (0..out.matrix.ncols()).map(|j| out.matrix[(i, j)]).sum())
        .collect();
    assert_eq!(row_sums, vec![1.0, 0.0, 0.0, 1.0]);

    assert_eq!(out.unseen.len(), 1);
    assert_eq!(out.unseen[0].column, "EDUCATION");
    assert_eq!(out.unseen[0].rows, 1);
}

#[test]
fn test_far_out_values_stay_finite() {
    let train = df! { "LIMIT_BAL" => [10_000.0f64, 20_000.0, 30_000.0] }.unwrap();
    let test = df! { "LIMIT_BAL" => [1e12f64, -1e12] }.unwrap();
    let partition = ColumnPartition {
        numeric: vec!["LIMIT_BAL".to_string()],
        categorical: vec![],
    };

    let transform = FittedTransform::fit(&train, &partition).unwrap();
    let out = transform.apply(&test).unwrap();
    assert!(out.matrix[(0, 0)].is_finite() && out.matrix[(0, 0)] > 0.0);
    assert!(out.matrix[(1, 0)].is_finite() && out.matrix[(1, 0)] < 0.0);
}

#[test]
fn test_constant_and_null_numeric_columns() {
    let train = df! {
        "flat" => [5.0f64, 5.0, 5.0],
        "gappy" => [Some(1.0f64), None, Some(3.0)],
    }
    .unwrap();
    let partition = ColumnPartition {
        numeric: vec!["flat".to_string(), "gappy".to_string()],
        categorical: vec![],
    };

    let transform = FittedTransform::fit(&train, &partition).unwrap();
    assert_eq!(transform.scaler().constant_columns(), vec!["flat"]);

    let out = transform.apply(&train).unwrap();
    for i in 0..3 {
        assert_eq!(out.matrix[(i, 0)], 0.0);
    }
    // The null maps to the scaled training mean
    assert_eq!(out.matrix[(1, 1)], 0.0);
    assert_close(out.matrix[(0, 1)], -1.0, 1e-12);
}

#[test]
fn test_repeated_decimal_column_is_flagged_constant() {
    let train = df! {
        "RATE" => [0.1f64; 6],
        "AGE" => [25.0f64, 31.0, 40.0, 52.0, 33.0, 29.0],
    }
    .unwrap();
    let test = df! {
        "RATE" => [0.2f64],
        "AGE" => [35.0f64],
    }
    .unwrap();
    let partition = ColumnPartition {
        numeric: vec!["RATE".to_string(), "AGE".to_string()],
        categorical: vec![],
    };

    let transform = FittedTransform::fit(&train, &partition).unwrap();
    assert_eq!(transform.scaler().constant_columns(), vec!["RATE"]);

    let out = transform.apply(&test).unwrap();
    assert_close(out.matrix[(0, 0)], 0.1, 1e-12);
}

#[test]
fn test_apply_without_fitted_column_fails() {
    let train = create_small_credit_dataframe();
    let split = split_features_target(&train, "default", None).unwrap();
    let transform = FittedTransform::fit(&split.features, &split.partition).unwrap();

    let other = df! { "AGE" => [30i64] }.unwrap();
    let err = transform.apply(&other).unwrap_err();
    assert_eq!(
        err.downcast_ref::<PipelineError>(),
        Some(&PipelineError::MissingColumn {
            column: "SEX".to_string()
        })
    );
}

#[test]
fn test_fit_uses_only_given_rows() {
    let train = df! { "AGE" => [20i64, 30] }.unwrap();
    let test = df! { "AGE" => [1000i64, 2000] }.unwrap();
    let partition = ColumnPartition {
        numeric: vec!["AGE".to_string()],
        categorical: vec![],
    };

    let transform = FittedTransform::fit(&train, &partition).unwrap();
    transform.apply(&test).unwrap();

    let params = &transform.scaler().params()[0];
    assert_close(params.mean, 25.0, 1e-12);
    assert_close(params.std, 5.0, 1e-12);
}

//! Benchmark of the transform and estimator hot path
//!
//! Run with: cargo bench --bench baseline_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use creditlens::eda::correlation_matrix;
use creditlens::pipeline::{
    fit_logistic_regression, partition_columns, EstimatorConfig, FittedTransform,
};

/// Synthetic credit-like table: numeric features, two categoricals, 0/1 labels
fn generate_credit_table(n_rows: usize, n_numeric: usize, seed: u64) -> (DataFrame, Vec<u8>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut columns: Vec<Column> = Vec::with_capacity(n_numeric + 2);

    for i in 0..n_numeric {
        let values: Vec<f64> = (0..n_rows).map(|_| rng.gen::<f64>() * 100.0).collect();
        columns.push(Column::new(format!("feature_{}", i).into(), values));
    }

    let sexes = ["F", "M"];
    let educations = ["graduate", "university", "high_school", "other"];
    let sex: Vec<&str> = (0..n_rows).map(|_| sexes[rng.gen_range(0..2)]).collect();
    let education: Vec<&str> = (0..n_rows).map(|_| educations[rng.gen_range(0..4)]).collect();
    columns.push(Column::new("SEX".into(), sex));
    columns.push(Column::new("EDUCATION".into(), education));

    let labels: Vec<u8> = (0..n_rows).map(|_| u8::from(rng.gen_bool(0.22))).collect();

    (
        DataFrame::new(columns).expect("Failed to create DataFrame"),
        labels,
    )
}

/// Fit + apply of the column transform for varying row counts
fn benchmark_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform_fit_apply");
    group.sample_size(20);

    for n_rows in [1_000, 10_000, 30_000] {
        let (df, _) = generate_credit_table(n_rows, 20, 42);
        let partition = partition_columns(&df);
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &df, |b, df| {
            b.iter(|| {
                let transform = FittedTransform::fit(black_box(df), &partition).unwrap();
                let _ = transform.apply(black_box(df));
            });
        });
    }

    group.finish();
}

/// Gradient-descent fitting at the default iteration budget
fn benchmark_estimator(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimator_fit");
    group.sample_size(10);

    for n_rows in [1_000, 10_000] {
        let (df, labels) = generate_credit_table(n_rows, 20, 42);
        let transform = FittedTransform::fit(&df, &partition_columns(&df)).unwrap();
        let matrix = transform.apply(&df).unwrap().matrix;
        let names = transform.feature_names();
        let config = EstimatorConfig::default();

        group.throughput(Throughput::Elements(n_rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &matrix, |b, matrix| {
            b.iter(|| {
                let _ = fit_logistic_regression(
                    black_box(matrix),
                    black_box(&labels),
                    names.clone(),
                    &config,
                );
            });
        });
    }

    group.finish();
}

/// Pairwise-complete correlation matrix for the EDA step
fn benchmark_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation_matrix");
    group.sample_size(20);

    for n_numeric in [10, 25, 50] {
        let (df, _) = generate_credit_table(10_000, n_numeric, 7);
        group.throughput(Throughput::Elements(((n_numeric * (n_numeric + 1)) / 2) as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n_numeric), &df, |b, df| {
            b.iter(|| {
                let _ = correlation_matrix(black_box(df));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_transform,
    benchmark_estimator,
    benchmark_correlation
);
criterion_main!(benches);

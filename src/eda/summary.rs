//! Per-column summaries: counts, missing values, types and descriptive statistics

use std::collections::HashMap;

use anyhow::Result;
use polars::prelude::*;
use rayon::prelude::*;

use crate::pipeline::{ColumnKind, PipelineError};

/// Count, missing and dtype for every column.
///
/// Columns of the returned table: `column`, `count`, `missing`, `dtype`.
pub fn column_summary(df: &DataFrame) -> Result<DataFrame> {
    let mut names = Vec::with_capacity(df.width());
    let mut counts = Vec::with_capacity(df.width());
    let mut missing = Vec::with_capacity(df.width());
    let mut dtypes = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let nulls = column.null_count();
        names.push(column.name().to_string());
        counts.push((column.len() - nulls) as u64);
        missing.push(nulls as u64);
        dtypes.push(column.dtype().to_string());
    }

    Ok(DataFrame::new(vec![
        Column::new("column".into(), names),
        Column::new("count".into(), counts),
        Column::new("missing".into(), missing),
        Column::new("dtype".into(), dtypes),
    ])?)
}

/// Missing value count per column, in table order
pub fn missing_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect()
}

/// Descriptive statistics of one column.
///
/// String columns fill `unique`/`top`/`freq`; numeric columns fill the moments
/// and quantiles. Inapplicable fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnDescription {
    pub column: String,
    pub count: usize,
    pub unique: Option<usize>,
    pub top: Option<String>,
    pub freq: Option<usize>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Quantile with linear interpolation between closest ranks.
///
/// `sorted` must be ascending and non-empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

fn describe_numeric(name: &str, column: &Column) -> Result<ColumnDescription> {
    let floats = column.cast(&DataType::Float64)?;
    let mut values: Vec<f64> = floats.f64()?.into_iter().flatten().collect();
    let mut description = ColumnDescription {
        column: name.to_string(),
        count: values.len(),
        ..Default::default()
    };

    if values.is_empty() {
        return Ok(description);
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    description.mean = Some(mean);
    if values.len() > 1 {
        let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        description.std = Some(var.sqrt());
    }
    description.min = values.first().copied();
    description.q25 = Some(quantile_sorted(&values, 0.25));
    description.median = Some(quantile_sorted(&values, 0.5));
    description.q75 = Some(quantile_sorted(&values, 0.75));
    description.max = values.last().copied();

    Ok(description)
}

fn describe_categorical(name: &str, column: &Column) -> Result<ColumnDescription> {
    let strings = column.cast(&DataType::String)?;
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    let mut count = 0usize;

    for value in strings.str()?.into_iter().flatten() {
        count += 1;
        let entry = frequency.entry(value).or_insert(0);
        if *entry == 0 {
            first_seen.push(value);
        }
        *entry += 1;
    }

    // Most frequent value; ties go to the value seen first
    let top = first_seen
        .iter()
        .fold(None::<(&str, usize)>, |best, &value| {
            let n = frequency[value];
            match best {
                Some((_, best_n)) if best_n >= n => best,
                _ => Some((value, n)),
            }
        });

    Ok(ColumnDescription {
        column: name.to_string(),
        count,
        unique: Some(frequency.len()),
        top: top.map(|(v, _)| v.to_string()),
        freq: top.map(|(_, n)| n),
        ..Default::default()
    })
}

/// Describe every column, computing columns in parallel
pub fn describe_columns(df: &DataFrame) -> Result<Vec<ColumnDescription>> {
    df.get_columns()
        .par_iter()
        .map(|column| {
            let name = column.name().as_str();
            match ColumnKind::of(column.dtype()) {
                ColumnKind::Numeric => describe_numeric(name, column),
                ColumnKind::Categorical => describe_categorical(name, column),
            }
        })
        .collect()
}

/// The descriptions as a table, one row per input column
pub fn describe(df: &DataFrame) -> Result<DataFrame> {
    let descriptions = describe_columns(df)?;

    let floats = |f: fn(&ColumnDescription) -> Option<f64>| -> Vec<Option<f64>> {
        descriptions.iter().map(f).collect()
    };

    Ok(DataFrame::new(vec![
        Column::new(
            "column".into(),
            descriptions.iter().map(|d| d.column.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "count".into(),
            descriptions.iter().map(|d| d.count as u64).collect::<Vec<_>>(),
        ),
        Column::new(
            "unique".into(),
            descriptions
                .iter()
                .map(|d| d.unique.map(|u| u as u64))
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "top".into(),
            descriptions.iter().map(|d| d.top.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "freq".into(),
            descriptions
                .iter()
                .map(|d| d.freq.map(|f| f as u64))
                .collect::<Vec<_>>(),
        ),
        Column::new("mean".into(), floats(|d: &ColumnDescription| d.mean)),
        Column::new("std".into(), floats(|d: &ColumnDescription| d.std)),
        Column::new("min".into(), floats(|d: &ColumnDescription| d.min)),
        Column::new("25%".into(), floats(|d: &ColumnDescription| d.q25)),
        Column::new("50%".into(), floats(|d: &ColumnDescription| d.median)),
        Column::new("75%".into(), floats(|d: &ColumnDescription| d.q75)),
        Column::new("max".into(), floats(|d: &ColumnDescription| d.max)),
    ])?)
}

/// A column read as optional floats
pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let col = df.column(column).map_err(|_| PipelineError::MissingColumn {
        column: column.to_string(),
    })?;
    Ok(col.cast(&DataType::Float64)?.f64()?.into_iter().collect())
}

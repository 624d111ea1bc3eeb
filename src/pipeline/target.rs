//! Target column analysis and label extraction
//!
//! The baseline needs a 0/1 label per row. A target that is already binary is
//! used as is; any other target needs a [`TargetMapping`] naming which value
//! is the event (default) and which the non-event.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::error::PipelineError;

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Mapping configuration for converting target column values to binary 0/1
#[derive(Debug, Clone, Serialize)]
pub struct TargetMapping {
    /// Value that maps to 1 (event)
    pub event_value: String,
    /// Value that maps to 0 (non-event)
    pub non_event_value: String,
}

impl TargetMapping {
    pub fn new(event_value: String, non_event_value: String) -> Self {
        Self {
            event_value,
            non_event_value,
        }
    }
}

/// Result of analyzing a target column
#[derive(Debug, Clone)]
pub enum TargetAnalysis {
    /// Target column is already binary 0/1, no mapping needed
    AlreadyBinary,
    /// Target column needs mapping - contains these unique values
    NeedsMapping { unique_values: Vec<String> },
}

/// Counts of each target value and the share of events
#[derive(Debug, Clone)]
pub struct TargetCounts {
    /// `(value, count)` pairs, most frequent first
    pub counts: Vec<(String, usize)>,
    /// Share of rows whose label is 1, over non-null rows
    pub default_rate: f64,
}

/// Fail with [`PipelineError::MissingTarget`] unless `target` is a column of `df`
pub fn ensure_target_present(df: &DataFrame, target: &str) -> Result<()> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    if !available.iter().any(|c| c == target) {
        return Err(PipelineError::MissingTarget {
            target: target.to_string(),
            available,
        }
        .into());
    }
    Ok(())
}

/// Analyze a target column to determine if it needs value mapping
pub fn analyze_target_column(df: &DataFrame, target: &str) -> Result<TargetAnalysis> {
    ensure_target_present(df, target)?;
    let target_col = df.column(target)?;

    if target_col.len() == 0 {
        anyhow::bail!("Target column '{}' is empty", target);
    }

    if target_col.null_count() == target_col.len() {
        anyhow::bail!("Target column '{}' contains only null values", target);
    }

    if target_col.dtype().is_primitive_numeric() || target_col.dtype() == &DataType::Boolean {
        let float_col = target_col.cast(&DataType::Float64)?;
        let unique = float_col.unique()?;
        let is_binary = unique
            .f64()?
            .into_iter()
            .flatten()
            .all(|v| v.abs() < TOLERANCE || (v - 1.0).abs() < TOLERANCE);

        if is_binary {
            return Ok(TargetAnalysis::AlreadyBinary);
        }
    }

    let mut unique_values: Vec<String> = column_to_string_vec(target_col)?
        .into_iter()
        .flatten()
        .collect();
    unique_values.sort();
    unique_values.dedup();

    Ok(TargetAnalysis::NeedsMapping { unique_values })
}

/// Extract one label per row.
///
/// Without a mapping the column must hold only 0 and 1 (nulls are rejected).
/// With a mapping, rows matching neither value come back as `None`.
pub fn extract_target_labels(
    df: &DataFrame,
    target: &str,
    mapping: Option<&TargetMapping>,
) -> Result<Vec<Option<u8>>> {
    ensure_target_present(df, target)?;
    let target_col = df.column(target)?;

    if let Some(mapping) = mapping {
        let labels = column_to_string_vec(target_col)?
            .into_iter()
            .map(|v| match v {
                Some(s) if s == mapping.event_value => Some(1),
                Some(s) if s == mapping.non_event_value => Some(0),
                _ => None,
            })
            .collect();
        return Ok(labels);
    }

    let non_binary = |reason: String| PipelineError::NonBinaryTarget {
        target: target.to_string(),
        reason,
    };

    if !(target_col.dtype().is_primitive_numeric() || target_col.dtype() == &DataType::Boolean) {
        return Err(non_binary(format!(
            "column has type {}; supply an event/non-event mapping",
            target_col.dtype()
        ))
        .into());
    }

    let float_col = target_col
        .cast(&DataType::Float64)
        .with_context(|| format!("Failed to read target column '{}' as numbers", target))?;

    let mut labels = Vec::with_capacity(float_col.len());
    for value in float_col.f64()?.into_iter() {
        match value {
            Some(v) if v.abs() < TOLERANCE => labels.push(Some(0)),
            Some(v) if (v - 1.0).abs() < TOLERANCE => labels.push(Some(1)),
            Some(v) => return Err(non_binary(format!("found value {}", v)).into()),
            None => return Err(non_binary("found a null label".to_string()).into()),
        }
    }

    Ok(labels)
}

/// Count target values and compute the default rate
pub fn target_counts(df: &DataFrame, target: &str) -> Result<TargetCounts> {
    ensure_target_present(df, target)?;
    let values = column_to_string_vec(df.column(target)?)?;

    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values.iter().flatten() {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total: usize = counts.iter().map(|(_, n)| n).sum();
    let events = counts
        .iter()
        .find(|(v, _)| v == "1" || v == "1.0" || v == "true")
        .map(|(_, n)| *n)
        .unwrap_or(0);
    let default_rate = if total > 0 {
        events as f64 / total as f64
    } else {
        0.0
    };

    Ok(TargetCounts {
        counts,
        default_rate,
    })
}

/// Convert a column to a Vec of Option<String> for comparison
fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_binary_int_target() {
        let df = df! {
            "default" => [0i32, 1, 0, 1, 0, 1],
            "LIMIT_BAL" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0],
        }
        .unwrap();

        let result = analyze_target_column(&df, "default").unwrap();
        assert!(matches!(result, TargetAnalysis::AlreadyBinary));
    }

    #[test]
    fn test_analyze_string_target_needs_mapping() {
        let df = df! {
            "default" => ["yes", "no", "yes", "no", "yes"],
            "LIMIT_BAL" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
        }
        .unwrap();

        match analyze_target_column(&df, "default").unwrap() {
            TargetAnalysis::NeedsMapping { unique_values } => {
                assert_eq!(unique_values, vec!["no".to_string(), "yes".to_string()]);
            }
            _ => panic!("Expected NeedsMapping"),
        }
    }

    #[test]
    fn test_extract_labels_rejects_non_binary() {
        let df = df! {
            "default" => [0i32, 1, 2],
        }
        .unwrap();

        let err = extract_target_labels(&df, "default", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NonBinaryTarget { .. })
        ));
    }

    #[test]
    fn test_extract_labels_with_mapping() {
        let df = df! {
            "default" => ["yes", "no", "maybe"],
        }
        .unwrap();

        let mapping = TargetMapping::new("yes".to_string(), "no".to_string());
        let labels = extract_target_labels(&df, "default", Some(&mapping)).unwrap();
        assert_eq!(labels, vec![Some(1), Some(0), None]);
    }

    #[test]
    fn test_missing_target_is_typed_error() {
        let df = df! { "AGE" => [25i64, 40] }.unwrap();

        let err = ensure_target_present(&df, "default").unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::MissingTarget { target, available }) => {
                assert_eq!(target, "default");
                assert_eq!(available, &vec!["AGE".to_string()]);
            }
            other => panic!("Expected MissingTarget, got {:?}", other),
        }
    }

    #[test]
    fn test_target_counts_and_rate() {
        let df = df! {
            "default" => [0i64, 0, 0, 1],
        }
        .unwrap();

        let counts = target_counts(&df, "default").unwrap();
        assert_eq!(counts.counts, vec![("0".to_string(), 3), ("1".to_string(), 1)]);
        assert!((counts.default_rate - 0.25).abs() < 1e-12);
    }
}

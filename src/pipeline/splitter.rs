//! Target/feature separation and type-based column partition
//!
//! The numeric/categorical partition is purely syntactic: a column is
//! categorical when its storage type is string-like, numeric otherwise. An
//! integer-coded category (e.g. `MARRIAGE`) is therefore treated as numeric.

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::target::{ensure_target_present, extract_target_labels, TargetMapping};

/// How a feature column is transformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    /// Classify a column by its storage type
    pub fn of(dtype: &DataType) -> Self {
        if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
            ColumnKind::Categorical
        } else {
            ColumnKind::Numeric
        }
    }
}

/// Feature column names split by kind, both in table order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnPartition {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnPartition {
    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Features and labels ready for the train/test split
#[derive(Debug, Clone)]
pub struct FeatureSplit {
    /// Table minus the target column
    pub features: DataFrame,
    /// One 0/1 label per feature row
    pub target: Vec<u8>,
    pub partition: ColumnPartition,
    /// Rows dropped because their target matched neither mapped value
    pub unmapped_rows: usize,
}

/// Partition every column of `df` into numeric and categorical
pub fn partition_columns(df: &DataFrame) -> ColumnPartition {
    let mut partition = ColumnPartition::default();
    for column in df.get_columns() {
        let name = column.name().to_string();
        match ColumnKind::of(column.dtype()) {
            ColumnKind::Numeric => partition.numeric.push(name),
            ColumnKind::Categorical => partition.categorical.push(name),
        }
    }
    partition
}

/// Separate the target from the features and partition the features.
///
/// Fails with `PipelineError::MissingTarget` when `target` is absent.
pub fn split_features_target(
    df: &DataFrame,
    target: &str,
    mapping: Option<&TargetMapping>,
) -> Result<FeatureSplit> {
    ensure_target_present(df, target)?;

    let labels = extract_target_labels(df, target, mapping)?;
    let keep: Vec<bool> = labels.iter().map(Option::is_some).collect();
    let unmapped_rows = keep.iter().filter(|k| !**k).count();

    let mut features = df.drop_many([target]);
    if unmapped_rows > 0 {
        let mask = BooleanChunked::from_slice("mapped".into(), &keep);
        features = features.filter(&mask)?;
    }
    let target: Vec<u8> = labels.into_iter().flatten().collect();
    let partition = partition_columns(&features);

    Ok(FeatureSplit {
        features,
        target,
        partition,
        unmapped_rows,
    })
}

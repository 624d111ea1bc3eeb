//! Seeded train/test split of feature rows and labels

use anyhow::Result;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use super::error::PipelineError;

/// Train/test split parameters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SplitConfig {
    /// Share of rows held out for evaluation, strictly between 0 and 1
    pub test_size: f64,
    /// RNG seed for the row shuffle
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
        }
    }
}

/// Disjoint train and test partitions
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Vec<u8>,
    pub y_test: Vec<u8>,
}

/// Shuffle row indices and return `(train, test)` index lists.
///
/// `n_test = ceil(test_size * n)`; the first `n_test` shuffled indices are
/// the test rows.
pub fn split_indices(n_rows: usize, config: &SplitConfig) -> Result<(Vec<usize>, Vec<usize>)> {
    let n_test = (config.test_size * n_rows as f64).ceil() as usize;
    if !(config.test_size > 0.0 && config.test_size < 1.0) || n_test == 0 || n_test >= n_rows {
        return Err(PipelineError::EmptySplit {
            rows: n_rows,
            test_size: config.test_size,
        }
        .into());
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Take the given rows of a table, in the given order
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}

/// Split features and labels into train and test partitions
pub fn train_test_split(
    features: &DataFrame,
    target: &[u8],
    config: &SplitConfig,
) -> Result<TrainTestSplit> {
    if features.height() != target.len() {
        return Err(PipelineError::LengthMismatch {
            rows: features.height(),
            labels: target.len(),
        }
        .into());
    }

    let (train_idx, test_idx) = split_indices(features.height(), config)?;

    Ok(TrainTestSplit {
        x_train: take_rows(features, &train_idx)?,
        x_test: take_rows(features, &test_idx)?,
        y_train: train_idx.iter().map(|&i| target[i]).collect(),
        y_test: test_idx.iter().map(|&i| target[i]).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes_round_test_up() {
        let (train, test) = split_indices(11, &SplitConfig::default()).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let (train, test) = split_indices(50, &SplitConfig::default()).unwrap();
        let train_set: HashSet<_> = train.iter().collect();
        assert!(test.iter().all(|i| !train_set.contains(i)));
        assert_eq!(train.len() + test.len(), 50);
    }

    #[test]
    fn test_split_is_reproducible() {
        let config = SplitConfig {
            test_size: 0.3,
            seed: 7,
        };
        assert_eq!(
            split_indices(40, &config).unwrap(),
            split_indices(40, &config).unwrap()
        );
    }

    #[test]
    fn test_split_rejects_empty_side() {
        let err = split_indices(1, &SplitConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::EmptySplit { .. })
        ));
    }
}

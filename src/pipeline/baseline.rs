//! End-to-end baseline: clean, split, transform, fit, evaluate

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::cleaner::{clean, CleanOptions, CleanSummary};
use super::encoder::UnseenCategories;
use super::estimator::{fit_logistic_regression, EstimatorConfig, LogisticModel};
use super::evaluator::{evaluate, Evaluation};
use super::split::{train_test_split, SplitConfig};
use super::splitter::{split_features_target, ColumnPartition};
use super::target::TargetMapping;
use super::transform::FittedTransform;

/// Everything the baseline run needs besides the table
#[derive(Debug, Clone, Serialize)]
pub struct BaselineConfig {
    pub target: String,
    pub target_mapping: Option<TargetMapping>,
    pub clean: CleanOptions,
    pub split: SplitConfig,
    pub estimator: EstimatorConfig,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            target: "default".to_string(),
            target_mapping: None,
            clean: CleanOptions::default(),
            split: SplitConfig::default(),
            estimator: EstimatorConfig::default(),
        }
    }
}

/// Results of a baseline run
#[derive(Debug, Clone)]
pub struct BaselineOutcome {
    pub clean_summary: CleanSummary,
    pub unmapped_rows: usize,
    pub partition: ColumnPartition,
    pub n_train: usize,
    pub n_test: usize,
    pub transform: FittedTransform,
    pub model: LogisticModel,
    pub evaluation: Evaluation,
    /// Unseen categories met while transforming the test rows
    pub unseen: Vec<UnseenCategories>,
}

/// Run the whole baseline on an in-memory table.
///
/// The transform is fitted on the training rows only and applied unchanged
/// to both partitions.
pub fn run_baseline(df: &DataFrame, config: &BaselineConfig) -> Result<BaselineOutcome> {
    let (cleaned, clean_summary) = clean(df, &config.clean)?;

    let features = split_features_target(&cleaned, &config.target, config.target_mapping.as_ref())?;
    let split = train_test_split(&features.features, &features.target, &config.split)?;

    let transform = FittedTransform::fit(&split.x_train, &features.partition)?;
    let train = transform.apply(&split.x_train)?;
    let test = transform.apply(&split.x_test)?;

    let model = fit_logistic_regression(
        &train.matrix,
        &split.y_train,
        transform.feature_names(),
        &config.estimator,
    )?;
    let evaluation = evaluate(&model, &test.matrix, &split.y_test)?;

    Ok(BaselineOutcome {
        clean_summary,
        unmapped_rows: features.unmapped_rows,
        partition: features.partition,
        n_train: split.y_train.len(),
        n_test: split.y_test.len(),
        transform,
        model,
        evaluation,
        unseen: test.unseen,
    })
}

//! Baseline results export to JSON

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    BaselineConfig, BaselineOutcome, CleanSummary, ColumnPartition, Evaluation, UnseenCategories,
};

/// Metadata about the baseline run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// creditlens version
    pub tool_version: String,
    /// Input file path
    pub input_file: String,
    /// Target column name
    pub target_column: String,
}

/// Row counts of each partition
#[derive(Serialize)]
pub struct SplitSizes {
    pub train_rows: usize,
    pub test_rows: usize,
    /// Rows left out because their target matched neither mapped value
    pub unmapped_rows: usize,
}

/// Fitted model parameters
#[derive(Serialize)]
pub struct ModelExport {
    pub intercept: f64,
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
    /// `(feature, weight)` pairs, largest magnitude first
    pub coefficients: Vec<(String, f64)>,
}

/// Complete baseline export with metadata
#[derive(Serialize)]
pub struct BaselineReport<'a> {
    pub metadata: RunMetadata,
    pub config: &'a BaselineConfig,
    pub cleaning: &'a CleanSummary,
    pub split: SplitSizes,
    pub columns: &'a ColumnPartition,
    /// Output columns of the fitted transform, in matrix order
    pub feature_names: Vec<String>,
    pub model: ModelExport,
    pub metrics: &'a Evaluation,
    pub unseen_categories: &'a [UnseenCategories],
}

impl<'a> BaselineReport<'a> {
    pub fn new(input_file: &Path, config: &'a BaselineConfig, outcome: &'a BaselineOutcome) -> Self {
        Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input_file.display().to_string(),
                target_column: config.target.clone(),
            },
            config,
            cleaning: &outcome.clean_summary,
            split: SplitSizes {
                train_rows: outcome.n_train,
                test_rows: outcome.n_test,
                unmapped_rows: outcome.unmapped_rows,
            },
            columns: &outcome.partition,
            feature_names: outcome.transform.feature_names(),
            model: ModelExport {
                intercept: outcome.model.bias,
                iterations: outcome.model.iterations,
                converged: outcome.model.converged,
                final_loss: outcome.model.final_loss,
                coefficients: outcome.model.coefficients(),
            },
            metrics: &outcome.evaluation,
            unseen_categories: &outcome.unseen,
        }
    }
}

/// Write the baseline report as pretty-printed JSON
pub fn export_baseline_report(
    input_file: &Path,
    config: &BaselineConfig,
    outcome: &BaselineOutcome,
    output_path: &Path,
) -> Result<()> {
    let report = BaselineReport::new(input_file, config, outcome);

    let json = serde_json::to_string_pretty(&report)
        .context("Failed to serialize baseline report to JSON")?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(output_path, json).with_context(|| {
        format!(
            "Failed to write baseline report to {}",
            output_path.display()
        )
    })?;

    Ok(())
}

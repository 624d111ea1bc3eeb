//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{CleanOptions, EstimatorConfig, SplitConfig, TargetMapping};

/// creditlens - Explore a credit-default table and fit a logistic-regression baseline
#[derive(Parser, Debug)]
#[command(name = "creditlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, global = true, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Skip interactive confirmation prompts
    #[arg(long, global = true, default_value = "false")]
    pub no_confirm: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summaries, correlations and charts written to an output directory
    Eda(EdaArgs),

    /// Clean the table, write the deduplicated copy and report split shapes
    Preprocess(PreprocessArgs),

    /// Fit and evaluate the logistic-regression baseline
    Baseline(BaselineArgs),
}

/// Input table and target column
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Input file path (CSV or Parquet)
    #[arg(short, long, default_value = "uci_credit_default.csv")]
    pub input: PathBuf,

    /// Target column name (1 = default)
    #[arg(short, long, default_value = "default")]
    pub target: String,
}

/// Row cleaning switches
#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    /// Identifier column to drop before modelling (e.g. ID)
    #[arg(long)]
    pub id_column: Option<String>,

    /// Drop rows with a missing value in any column
    #[arg(long, default_value = "false")]
    pub drop_missing: bool,

    /// Keep exact duplicate rows
    #[arg(long, default_value = "false")]
    pub keep_duplicates: bool,
}

impl CleanArgs {
    pub fn options(&self) -> CleanOptions {
        CleanOptions {
            drop_duplicates: !self.keep_duplicates,
            id_column: self.id_column.clone(),
            drop_missing: self.drop_missing,
        }
    }
}

/// Train/test split parameters
#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Share of rows held out for evaluation (0 < size < 1)
    #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Seed for the row shuffle
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

impl SplitArgs {
    pub fn config(&self) -> SplitConfig {
        SplitConfig {
            test_size: self.test_size,
            seed: self.seed,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct EdaArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Directory for CSV tables and PNG charts
    #[arg(short, long, default_value = "eda_outputs")]
    pub output_dir: PathBuf,

    /// Number of top-correlated features charted per class
    #[arg(long, default_value = "8")]
    pub top_features: usize,

    /// Rows sampled for the per-feature charts
    #[arg(long, default_value = "3000")]
    pub sample_size: usize,

    /// Seed for the chart sample
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Write only the CSV tables
    #[arg(long, default_value = "false")]
    pub no_plots: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PreprocessArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub clean: CleanArgs,

    #[command(flatten)]
    pub split: SplitArgs,

    /// Output CSV path.
    /// Defaults to input directory with '_deduped' suffix (e.g., data.csv → data_deduped.csv).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl PreprocessArgs {
    /// The output path, derived from the input if not explicitly provided
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| deduped_path(&self.data.input))
    }
}

#[derive(Args, Debug, Clone)]
pub struct BaselineArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub clean: CleanArgs,

    #[command(flatten)]
    pub split: SplitArgs,

    /// Value in target column that represents EVENT (maps to 1).
    /// Required with --non-event-value when target is not binary 0/1.
    #[arg(long, requires = "non_event_value")]
    pub event_value: Option<String>,

    /// Value in target column that represents NON-EVENT (maps to 0).
    /// Required with --event-value when target is not binary 0/1.
    #[arg(long, requires = "event_value")]
    pub non_event_value: Option<String>,

    /// Maximum Newton iterations for the estimator
    #[arg(long, default_value = "1000")]
    pub max_iter: usize,

    /// Gradient step size used when the Newton system is singular
    #[arg(long, default_value = "0.5", value_parser = validate_positive)]
    pub learning_rate: f64,

    /// L2 regularization strength
    #[arg(long, default_value = "1.0", value_parser = validate_non_negative)]
    pub l2: f64,

    /// Number of coefficients printed
    #[arg(long, default_value = "10")]
    pub top_coefficients: usize,

    /// Write a JSON report of the run to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl BaselineArgs {
    pub fn target_mapping(&self) -> Option<TargetMapping> {
        match (&self.event_value, &self.non_event_value) {
            (Some(event), Some(non_event)) => {
                Some(TargetMapping::new(event.clone(), non_event.clone()))
            }
            _ => None,
        }
    }

    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            max_iter: self.max_iter,
            learning_rate: self.learning_rate,
            l2: self.l2,
            ..EstimatorConfig::default()
        }
    }
}

/// `<dir>/<stem>_deduped.csv` next to the input
pub fn deduped_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}_deduped.csv", stem))
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.parse()
        .map_err(|_| format!("'{}' is not a valid number", s))
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}

/// Validator for learning_rate parameter
fn validate_positive(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(format!("value must be positive, got {}", value))
    }
}

/// Validator for l2 parameter
fn validate_non_negative(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value >= 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(format!("value must be zero or positive, got {}", value))
    }
}

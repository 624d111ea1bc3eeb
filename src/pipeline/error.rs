//! Typed failures of the modelling pipeline
//!
//! These travel inside `anyhow::Error` so callers that care can recover the
//! variant with `downcast_ref::<PipelineError>()`.

use thiserror::Error;

/// Configuration and data-contract errors raised by pipeline stages.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    /// The designated target column is not in the table.
    #[error("Target column '{target}' not found in dataset. Available columns: {available:?}")]
    MissingTarget {
        target: String,
        available: Vec<String>,
    },

    /// The target column holds something other than 0/1 labels.
    #[error("Target column '{target}' must be binary (0/1): {reason}")]
    NonBinaryTarget { target: String, reason: String },

    /// A column the transform was fitted on is absent from the table it is applied to.
    #[error("Column '{column}' was present when fitting but is missing from the input")]
    MissingColumn { column: String },

    /// One side of a train/test split would hold no rows.
    #[error("Train/test split of {rows} row(s) with test size {test_size} leaves an empty side")]
    EmptySplit { rows: usize, test_size: f64 },

    /// The estimator was given nothing to learn from.
    #[error("Cannot fit estimator on an empty training matrix")]
    EmptyTrainingSet,

    /// Feature rows and labels disagree in length.
    #[error("Length mismatch: {rows} feature row(s) but {labels} label(s)")]
    LengthMismatch { rows: usize, labels: usize },
}

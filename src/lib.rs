//! creditlens: credit-default EDA and baseline library
//!
//! Loads a tabular credit-default dataset, produces exploratory summaries and
//! charts, and trains and evaluates a logistic-regression baseline behind a
//! fit-on-train, apply-to-both preprocessing transform.

pub mod cli;
pub mod eda;
pub mod pipeline;
pub mod report;
pub mod utils;

//! EDA module - column summaries, correlations, charts

pub mod artifacts;
pub mod correlation;
pub mod plots;
pub mod summary;

pub use artifacts::*;
pub use correlation::{correlation_matrix, correlation_with_target, CorrelationMatrix};
pub use summary::*;

//! Pipeline module - loader, cleaner, splitter, transformer, estimator, evaluator

pub mod baseline;
pub mod cleaner;
pub mod encoder;
pub mod error;
pub mod estimator;
pub mod evaluator;
pub mod loader;
pub mod scaler;
pub mod split;
pub mod splitter;
pub mod target;
pub mod transform;

pub use baseline::*;
pub use cleaner::*;
pub use encoder::{CategoryVocabulary, FittedEncoder, UnseenCategories};
pub use error::PipelineError;
pub use estimator::*;
pub use evaluator::*;
pub use loader::*;
pub use scaler::{FittedScaler, ScalerParams};
pub use split::*;
pub use splitter::*;
pub use target::*;
pub use transform::*;

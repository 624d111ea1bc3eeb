//! Report module - console tables and the JSON baseline report

pub mod export;
pub mod tables;

pub use export::*;
pub use tables::*;

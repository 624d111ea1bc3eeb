//! Column transform: scaled numeric columns followed by one-hot categorical columns
//!
//! Fitting and applying are separate phases. [`FittedTransform::fit`] sees
//! only the training rows and produces immutable parameters;
//! [`FittedTransform::apply`] reuses them for the training rows, the test rows
//! or anything else with the same columns.

use anyhow::Result;
use faer::Mat;
use polars::prelude::*;

use super::encoder::{FittedEncoder, UnseenCategories};
use super::scaler::FittedScaler;
use super::splitter::ColumnPartition;

/// Scaler and encoder parameters learned from a training table
#[derive(Debug, Clone)]
pub struct FittedTransform {
    scaler: FittedScaler,
    encoder: FittedEncoder,
}

/// Output of applying a fitted transform
#[derive(Debug, Clone)]
pub struct Transformed {
    /// Rows x (numeric columns + indicator columns)
    pub matrix: Mat<f64>,
    /// Categorical columns that carried values unseen at fit time
    pub unseen: Vec<UnseenCategories>,
}

impl FittedTransform {
    /// Learn scaling parameters and category vocabularies from `train`
    pub fn fit(train: &DataFrame, partition: &ColumnPartition) -> Result<Self> {
        Ok(Self {
            scaler: FittedScaler::fit(train, &partition.numeric)?,
            encoder: FittedEncoder::fit(train, &partition.categorical)?,
        })
    }

    pub fn scaler(&self) -> &FittedScaler {
        &self.scaler
    }

    pub fn encoder(&self) -> &FittedEncoder {
        &self.encoder
    }

    /// Number of output columns
    pub fn width(&self) -> usize {
        self.scaler.len() + self.encoder.width()
    }

    /// Output column names: numeric names, then `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        let numeric = self.scaler.params().iter().map(|p| p.column.clone());
        let indicators = self.encoder.vocabularies().iter().flat_map(|vocab| {
            vocab
                .categories()
                .iter()
                .map(move |category| format!("{}_{}", vocab.column, category))
        });
        numeric.chain(indicators).collect()
    }

    /// Apply the fitted parameters to `df`.
    ///
    /// Extra columns in `df` are ignored; a fitted column that is missing is
    /// an error.
    pub fn apply(&self, df: &DataFrame) -> Result<Transformed> {
        let n_rows = df.height();
        let mut matrix = Mat::<f64>::zeros(n_rows, self.width());
        let mut unseen = Vec::new();

        for index in 0..self.scaler.len() {
            let scaled = self.scaler.apply_column(df, index)?;
            for (row, value) in scaled.into_iter().enumerate() {
                matrix[(row, index)] = value;
            }
        }

        let mut offset = self.scaler.len();
        for (index, vocabulary) in self.encoder.vocabularies().iter().enumerate() {
            let (positions, column_unseen) = self.encoder.apply_column(df, index)?;
            for (row, position) in positions.into_iter().enumerate() {
                if let Some(pos) = position {
                    matrix[(row, offset + pos)] = 1.0;
                }
            }
            unseen.extend(column_unseen);
            offset += vocabulary.len();
        }

        Ok(Transformed { matrix, unseen })
    }
}

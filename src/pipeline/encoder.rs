//! One-hot encoding of categorical columns
//!
//! The vocabulary of a column is its distinct non-null training values in
//! first-seen order. At apply time a value outside the vocabulary encodes to
//! all zeros and is counted rather than rejected.

use std::collections::HashMap;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::error::PipelineError;

/// Fixed category set of one column
#[derive(Debug, Clone, Default)]
pub struct CategoryVocabulary {
    pub column: String,
    categories: Vec<String>,
    positions: HashMap<String, usize>,
}

impl CategoryVocabulary {
    /// Collect the distinct non-null values in first-seen order
    pub fn fit<'a, I>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut vocabulary = Self {
            column: column.to_string(),
            ..Default::default()
        };
        for value in values.into_iter().flatten() {
            if !vocabulary.positions.contains_key(value) {
                vocabulary
                    .positions
                    .insert(value.to_string(), vocabulary.categories.len());
                vocabulary.categories.push(value.to_string());
            }
        }
        vocabulary
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Position of a category, `None` when unseen during fitting
    pub fn position(&self, value: &str) -> Option<usize> {
        self.positions.get(value).copied()
    }

    /// One-hot vector of length `len()`; all zeros for null or unseen values
    pub fn encode(&self, value: Option<&str>) -> Vec<f64> {
        let mut encoded = vec![0.0; self.len()];
        if let Some(pos) = value.and_then(|v| self.position(v)) {
            encoded[pos] = 1.0;
        }
        encoded
    }
}

/// Rows of one column that carried a value missing from the vocabulary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnseenCategories {
    pub column: String,
    pub rows: usize,
    /// A few of the offending values, for the warning message
    pub examples: Vec<String>,
}

/// Maximum number of unseen example values kept per column
const MAX_UNSEEN_EXAMPLES: usize = 5;

/// Read a column as optional strings
pub(crate) fn column_as_str(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let col = df.column(column).map_err(|_| PipelineError::MissingColumn {
        column: column.to_string(),
    })?;
    let strings = col
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", column))?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// Vocabularies for every categorical feature column
#[derive(Debug, Clone, Default)]
pub struct FittedEncoder {
    vocabularies: Vec<CategoryVocabulary>,
}

impl FittedEncoder {
    /// Learn vocabularies for `columns` from the training table
    pub fn fit(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let vocabularies = columns
            .iter()
            .map(|name| {
                let values = column_as_str(df, name)?;
                Ok(CategoryVocabulary::fit(
                    name,
                    values.iter().map(|v| v.as_deref()),
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { vocabularies })
    }

    pub fn vocabularies(&self) -> &[CategoryVocabulary] {
        &self.vocabularies
    }

    /// Total number of indicator columns produced
    pub fn width(&self) -> usize {
        self.vocabularies.iter().map(|v| v.len()).sum()
    }

    /// Encode the `index`-th fitted column of `df`.
    ///
    /// Returns, per row, the position of the hot indicator (`None` for an
    /// all-zero row) plus a record of unseen values if there were any.
    pub fn apply_column(
        &self,
        df: &DataFrame,
        index: usize,
    ) -> Result<(Vec<Option<usize>>, Option<UnseenCategories>)> {
        let vocabulary = &self.vocabularies[index];
        let values = column_as_str(df, &vocabulary.column)?;

        let mut unseen_rows = 0usize;
        let mut examples: Vec<String> = Vec::new();
        let positions = values
            .iter()
            .map(|value| {
                let value = value.as_deref()?;
                let pos = vocabulary.position(value);
                if pos.is_none() {
                    unseen_rows += 1;
                    if examples.len() < MAX_UNSEEN_EXAMPLES && !examples.iter().any(|e| e == value)
                    {
                        examples.push(value.to_string());
                    }
                }
                pos
            })
            .collect();

        let unseen = (unseen_rows > 0).then(|| UnseenCategories {
            column: vocabulary.column.clone(),
            rows: unseen_rows,
            examples,
        });

        Ok((positions, unseen))
    }
}

//! Row and column cleaning before modelling
//!
//! Three independent steps, applied in this order when enabled:
//! exact-duplicate row removal (first occurrence kept), identifier column
//! removal, and removal of rows holding any missing value.

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

/// Which cleaning steps to run
#[derive(Debug, Clone, Serialize)]
pub struct CleanOptions {
    /// Drop rows that exactly repeat an earlier row
    pub drop_duplicates: bool,
    /// Identifier column to drop if present
    pub id_column: Option<String>,
    /// Drop rows with a null in any column
    pub drop_missing: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            drop_duplicates: true,
            id_column: None,
            drop_missing: false,
        }
    }
}

/// What the cleaner removed
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanSummary {
    pub rows_before: usize,
    pub duplicates_removed: usize,
    pub id_column_dropped: Option<String>,
    pub missing_rows_removed: usize,
    pub rows_after: usize,
}

/// Drop rows that exactly duplicate an earlier row.
///
/// Nulls compare equal to each other but never to the text "null".
/// Returns the deduplicated table and the number of rows removed.
pub fn drop_duplicate_rows(df: &DataFrame) -> Result<(DataFrame, usize)> {
    if df.height() == 0 || df.width() == 0 {
        return Ok((df.clone(), 0));
    }

    let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    let removed = df.height() - deduped.height();
    Ok((deduped, removed))
}

/// Drop a named column if it exists; reports whether it was dropped
pub fn drop_column_if_present(df: &DataFrame, column: &str) -> (DataFrame, bool) {
    let present = df
        .get_column_names()
        .iter()
        .any(|name| name.as_str() == column);

    if present {
        (df.drop_many([column]), true)
    } else {
        (df.clone(), false)
    }
}

/// Drop rows holding a null, or a float NaN, in any column.
///
/// Returns the filtered table and the number of rows removed.
pub fn drop_rows_with_missing(df: &DataFrame) -> Result<(DataFrame, usize)> {
    let complete = df
        .clone()
        .lazy()
        .fill_nan(lit(NULL))
        .collect()?
        .drop_nulls::<String>(None)?;
    let removed = df.height() - complete.height();
    Ok((complete, removed))
}

/// Run the enabled cleaning steps
pub fn clean(df: &DataFrame, options: &CleanOptions) -> Result<(DataFrame, CleanSummary)> {
    let mut summary = CleanSummary {
        rows_before: df.height(),
        ..Default::default()
    };

    let mut current = df.clone();

    if options.drop_duplicates {
        let (deduped, removed) = drop_duplicate_rows(&current)?;
        current = deduped;
        summary.duplicates_removed = removed;
    }

    if let Some(id_column) = &options.id_column {
        let (without_id, dropped) = drop_column_if_present(&current, id_column);
        current = without_id;
        if dropped {
            summary.id_column_dropped = Some(id_column.clone());
        }
    }

    if options.drop_missing {
        let (complete, removed) = drop_rows_with_missing(&current)?;
        current = complete;
        summary.missing_rows_removed = removed;
    }

    summary.rows_after = current.height();
    Ok((current, summary))
}

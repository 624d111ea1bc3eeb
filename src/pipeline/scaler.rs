//! Standardization of numeric columns
//!
//! [`FittedScaler::fit`] learns a mean and standard deviation per column from
//! the training rows; the fitted parameters are then applied unchanged to any
//! table with [`FittedScaler::apply_column`].

use anyhow::{Context, Result};
use polars::prelude::*;

use super::error::PipelineError;

/// Relative tolerance under which a standard deviation counts as zero
const CONSTANT_TOLERANCE: f64 = 10.0 * f64::EPSILON;

/// Whether `std` is rounding noise around `mean` rather than real spread
fn is_negligible_spread(std: f64, mean: f64) -> bool {
    std <= CONSTANT_TOLERANCE * mean.abs().max(1.0)
}

/// Learned scaling parameters for one numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerParams {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation of the fitting data
    pub std: f64,
    /// Divisor actually used; 1.0 when `std` is negligible
    pub scale: f64,
}

impl ScalerParams {
    /// Fit on the finite, non-null values of a column.
    ///
    /// A column with no such values gets mean 0 and scale 1.
    pub fn fit(column: &str, values: &[Option<f64>]) -> Self {
        let present: Vec<f64> = values
            .iter()
            .flatten()
            .copied()
            .filter(|x| x.is_finite())
            .collect();
        let n = present.len() as f64;

        let (mean, std) = if present.is_empty() {
            (0.0, 0.0)
        } else {
            let mean = present.iter().sum::<f64>() / n;
            let var = present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            (mean, var.sqrt())
        };

        let scale = if is_negligible_spread(std, mean) || !std.is_finite() {
            1.0
        } else {
            std
        };

        Self {
            column: column.to_string(),
            mean,
            std,
            scale,
        }
    }

    /// Whether the fitting data had no spread beyond rounding error
    pub fn is_constant(&self) -> bool {
        is_negligible_spread(self.std, self.mean)
    }

    /// `(x - mean) / scale`, kept within the finite range.
    ///
    /// A missing or NaN value maps to 0.0, the scaled mean.
    pub fn transform(&self, value: Option<f64>) -> f64 {
        match value {
            Some(x) if !x.is_nan() => ((x - self.mean) / self.scale).clamp(-f64::MAX, f64::MAX),
            _ => 0.0,
        }
    }

    pub fn inverse(&self, scaled: f64) -> f64 {
        scaled * self.scale + self.mean
    }
}

/// Read a column as optional floats; NaN is read as missing
pub(crate) fn column_as_f64(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let col = df.column(column).map_err(|_| PipelineError::MissingColumn {
        column: column.to_string(),
    })?;
    let floats = col
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' cannot be read as numbers", column))?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Scaling parameters for every numeric feature column
#[derive(Debug, Clone, Default)]
pub struct FittedScaler {
    params: Vec<ScalerParams>,
}

impl FittedScaler {
    /// Learn parameters for `columns` from the training table
    pub fn fit(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let params = columns
            .iter()
            .map(|name| Ok(ScalerParams::fit(name, &column_as_f64(df, name)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Columns whose training variance was zero up to rounding
    pub fn constant_columns(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.is_constant())
            .map(|p| p.column.as_str())
            .collect()
    }

    /// Scale the `index`-th fitted column of `df`
    pub fn apply_column(&self, df: &DataFrame, index: usize) -> Result<Vec<f64>> {
        let params = &self.params[index];
        let values = column_as_f64(df, &params.column)?;
        Ok(values.into_iter().map(|v| params.transform(v)).collect())
    }

    /// Undo the scaling of the `index`-th fitted column
    pub fn inverse_column(&self, index: usize, scaled: &[f64]) -> Vec<f64> {
        let params = &self.params[index];
        scaled.iter().map(|&v| params.inverse(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_uses_population_std() {
        let params = ScalerParams::fit("AGE", &[Some(25.0), Some(40.0)]);
        assert!((params.mean - 32.5).abs() < 1e-12);
        assert!((params.std - 7.5).abs() < 1e-12);
        assert!((params.transform(Some(40.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_centered_not_divided() {
        let params = ScalerParams::fit("PAY_0", &[Some(3.0), Some(3.0), Some(3.0)]);
        assert!(params.is_constant());
        assert_eq!(params.scale, 1.0);
        assert_eq!(params.transform(Some(3.0)), 0.0);
        assert_eq!(params.transform(Some(5.0)), 2.0);
    }

    #[test]
    fn test_nulls_ignored_when_fitting() {
        let params = ScalerParams::fit("BILL_AMT1", &[Some(1.0), None, Some(3.0)]);
        assert!((params.mean - 2.0).abs() < 1e-12);
        assert_eq!(params.transform(None), 0.0);
    }

    #[test]
    fn test_repeated_decimal_counts_as_constant() {
        let params = ScalerParams::fit("RATE", &[Some(0.1); 7]);
        assert!(params.std < 1e-15);
        assert!(params.is_constant());
        assert_eq!(params.scale, 1.0);
        assert!((params.transform(Some(0.2)) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_small_real_spread_is_scaled() {
        let params = ScalerParams::fit("RATE", &[Some(1e-6), Some(3e-6)]);
        assert!(!params.is_constant());
        assert!((params.transform(Some(3e-6)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_values_stay_finite() {
        let params = ScalerParams::fit("BILL_AMT1", &[Some(0.0), Some(0.5)]);
        assert!(params.scale < 1.0);
        assert_eq!(params.transform(Some(1e308)), f64::MAX);
        assert_eq!(params.transform(Some(-1e308)), -f64::MAX);
        assert_eq!(params.transform(Some(f64::INFINITY)), f64::MAX);
    }

    #[test]
    fn test_nan_is_treated_as_missing() {
        let params = ScalerParams::fit("BILL_AMT1", &[Some(1.0), Some(f64::NAN), Some(3.0)]);
        assert!((params.mean - 2.0).abs() < 1e-12);
        assert!((params.std - 1.0).abs() < 1e-12);
        assert_eq!(params.transform(Some(f64::NAN)), 0.0);
    }

    #[test]
    fn test_all_null_column() {
        let params = ScalerParams::fit("EMPTY", &[None, None]);
        assert_eq!(params.mean, 0.0);
        assert_eq!(params.scale, 1.0);
    }
}

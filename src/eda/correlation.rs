//! Pearson correlations between numeric columns

use anyhow::Result;
use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;

/// Symmetric correlation matrix over the numeric columns of a table.
///
/// Undefined entries (a constant column, or fewer than two complete pairs)
/// hold NaN.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Mat<f64>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        let value = self.values[(i, j)];
        (!value.is_nan()).then_some(value)
    }

    /// The matrix as a table: a `column` name column, then one column per feature
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.len() + 1);
        columns.push(Column::new("column".into(), self.names.clone()));
        for (j, name) in self.names.iter().enumerate() {
            let values: Vec<Option<f64>> = (0..self.len())
                .map(|i| {
                    let v = self.values[(i, j)];
                    (!v.is_nan()).then_some(v)
                })
                .collect();
            columns.push(Column::new(name.as_str().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Pearson correlation over rows where both values are present.
///
/// Single-pass Welford update for numerical stability.
fn pearson_pairwise_complete(xs: &Float64Chunked, ys: &Float64Chunked) -> Option<f64> {
    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (x, y) in xs.iter().zip(ys.iter()) {
        if let (Some(x), Some(y)) = (x, y) {
            n += 1.0;
            let dx = x - mean_x;
            let dy = y - mean_y;
            mean_x += dx / n;
            mean_y += dy / n;
            var_x += dx * (x - mean_x);
            var_y += dy * (y - mean_y);
            cov_xy += dx * (y - mean_y);
        }
    }

    if n < 2.0 || var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    Some((cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Correlation matrix of every primitive numeric column in `df`
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    let float_columns: Vec<(String, Column)> = df
        .get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric())
        .map(|col| Ok((col.name().to_string(), col.cast(&DataType::Float64)?)))
        .collect::<Result<Vec<_>>>()?;

    let n_cols = float_columns.len();
    let pairs: Vec<(usize, usize)> = (0..n_cols)
        .flat_map(|i| (i..n_cols).map(move |j| (i, j)))
        .collect();

    let correlations: Vec<(usize, usize, f64)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let xs = float_columns[i].1.f64()?;
            let ys = float_columns[j].1.f64()?;
            let corr = pearson_pairwise_complete(xs, ys).unwrap_or(f64::NAN);
            Ok((i, j, corr))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut values = Mat::<f64>::zeros(n_cols, n_cols);
    for (i, j, corr) in correlations {
        values[(i, j)] = corr;
        values[(j, i)] = corr;
    }

    Ok(CorrelationMatrix {
        names: float_columns.into_iter().map(|(name, _)| name).collect(),
        values,
    })
}

/// Absolute correlation of each numeric column with `target`, strongest first.
///
/// The target itself and undefined correlations are left out. Returns an
/// empty list when the target is not a numeric column.
pub fn correlation_with_target(matrix: &CorrelationMatrix, target: &str) -> Vec<(String, f64)> {
    let Some(t) = matrix.index_of(target) else {
        return Vec::new();
    };

    let mut with_target: Vec<(String, f64)> = matrix
        .names
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != t)
        .filter_map(|(i, name)| {
            let corr = matrix.values[(i, t)];
            (!corr.is_nan()).then(|| (name.clone(), corr.abs()))
        })
        .collect();

    with_target.sort_by(|a, b| b.1.total_cmp(&a.1));
    with_target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_and_inverse_correlation() {
        let df = df! {
            "a" => [1.0f64, 2.0, 3.0, 4.0],
            "b" => [2.0f64, 4.0, 6.0, 8.0],
            "c" => [4.0f64, 3.0, 2.0, 1.0],
        }
        .unwrap();

        let matrix = correlation_matrix(&df).unwrap();
        assert!((matrix.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get("a", "c").unwrap() + 1.0).abs() < 1e-12);
        assert!((matrix.get("a", "a").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let df = df! {
            "a" => [1.0f64, 2.0, 3.0],
            "flat" => [5.0f64, 5.0, 5.0],
        }
        .unwrap();

        let matrix = correlation_matrix(&df).unwrap();
        assert!(matrix.get("a", "flat").is_none());
    }

    #[test]
    fn test_string_columns_are_skipped() {
        let df = df! {
            "a" => [1i64, 2, 3],
            "SEX" => ["M", "F", "M"],
        }
        .unwrap();

        let matrix = correlation_matrix(&df).unwrap();
        assert_eq!(matrix.names, vec!["a".to_string()]);
    }
}

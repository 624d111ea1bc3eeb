//! L2-regularized logistic regression fitted by damped Newton iterations
//!
//! Objective: mean log-loss + `l2 / (2n) * ||w||^2`, bias unpenalized. With
//! `l2 = 1.0` this matches the usual `C = 1` regularization strength. Each
//! step solves the Hessian system with a Cholesky factorization and halves
//! the step until the objective does not increase.

use anyhow::Result;
use faer::prelude::SpSolver;
use faer::{Mat, Side};
use serde::Serialize;

use super::error::PipelineError;

/// Probabilities are clamped to `[EPS, 1 - EPS]` inside the log-loss
const EPS: f64 = 1e-15;

/// Step halvings tried before a step is accepted as is
const MAX_HALVINGS: usize = 30;

/// Estimator hyperparameters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EstimatorConfig {
    /// Upper bound on Newton steps
    pub max_iter: usize,
    /// Gradient step size used when the Hessian cannot be factorized;
    /// capped by the curvature bound of the data
    pub learning_rate: f64,
    /// L2 penalty strength (inverse of C)
    pub l2: f64,
    /// Stop once every gradient component is below this in magnitude
    pub tolerance: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            learning_rate: 0.5,
            l2: 1.0,
            tolerance: 1e-6,
        }
    }
}

/// Fitted linear decision boundary
#[derive(Debug, Clone, Serialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Newton steps taken
    pub iterations: usize,
    pub converged: bool,
    /// Objective value at the returned parameters
    pub final_loss: f64,
}

/// Numerically stable logistic function
#[inline]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Mean log-loss of probabilities against 0/1 labels
pub fn log_loss(y_true: &[u8], proba: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let total: f64 = y_true
        .iter()
        .zip(proba)
        .map(|(&y, &p)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            if y == 1 {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / y_true.len() as f64
}

/// Upper bound on the curvature of the objective, from the trace of `XᵀX / n`.
///
/// `x` already carries the bias column of ones.
fn lipschitz_bound(x: &Mat<f64>, l2: f64) -> f64 {
    let n = x.nrows() as f64;
    let mut sum_sq = 0.0;
    for j in 0..x.ncols() {
        for i in 0..x.nrows() {
            sum_sq += x[(i, j)] * x[(i, j)];
        }
    }
    0.25 * sum_sq / n + l2 / n
}

fn linear_scores(x: &Mat<f64>, weights: &Mat<f64>, bias: f64) -> Vec<f64> {
    let z = x * weights;
    (0..x.nrows()).map(|i| z[(i, 0)] + bias).collect()
}

/// Feature matrix with a trailing column of ones for the bias
fn with_bias_column(x: &Mat<f64>) -> Mat<f64> {
    let p = x.ncols();
    Mat::from_fn(x.nrows(), p + 1, |i, j| if j < p { x[(i, j)] } else { 1.0 })
}

/// Penalized objective at `theta`; the last entry of `theta` is the bias
fn objective(xa: &Mat<f64>, y: &[u8], theta: &Mat<f64>, l2: f64) -> f64 {
    let scores = xa * theta;
    let proba: Vec<f64> = (0..xa.nrows()).map(|i| sigmoid(scores[(i, 0)])).collect();
    let penalty: f64 = (0..theta.nrows() - 1).map(|j| theta[(j, 0)].powi(2)).sum();
    log_loss(y, &proba) + l2 * penalty / (2.0 * y.len() as f64)
}

/// Fit a logistic regression on a transformed matrix and 0/1 labels
pub fn fit_logistic_regression(
    x: &Mat<f64>,
    y: &[u8],
    feature_names: Vec<String>,
    config: &EstimatorConfig,
) -> Result<LogisticModel> {
    let n_rows = x.nrows();
    let n_features = x.ncols();

    if n_rows == 0 {
        return Err(PipelineError::EmptyTrainingSet.into());
    }
    if y.len() != n_rows {
        return Err(PipelineError::LengthMismatch {
            rows: n_rows,
            labels: y.len(),
        }
        .into());
    }
    anyhow::ensure!(
        feature_names.len() == n_features,
        "Expected {} feature name(s), got {}",
        n_features,
        feature_names.len()
    );

    let n = n_rows as f64;
    let dim = n_features + 1;
    let xa = with_bias_column(x);
    let fallback_step = config
        .learning_rate
        .min(1.0 / lipschitz_bound(&xa, config.l2));

    let mut theta = Mat::<f64>::zeros(dim, 1);
    let mut loss = objective(&xa, y, &theta, config.l2);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        let scores = &xa * &theta;
        let proba: Vec<f64> = (0..n_rows).map(|i| sigmoid(scores[(i, 0)])).collect();
        let residual = Mat::from_fn(n_rows, 1, |i, _| proba[i] - f64::from(y[i]));

        let mut grad = xa.transpose() * &residual;
        for j in 0..dim {
            grad[(j, 0)] /= n;
            if j < n_features {
                grad[(j, 0)] += config.l2 * theta[(j, 0)] / n;
            }
        }

        let max_grad = (0..dim).fold(0.0_f64, |acc, j| acc.max(grad[(j, 0)].abs()));
        if max_grad < config.tolerance {
            converged = true;
            break;
        }

        let weighted = Mat::from_fn(n_rows, dim, |i, j| proba[i] * (1.0 - proba[i]) * xa[(i, j)]);
        let mut hessian = xa.transpose() * &weighted;
        for j in 0..dim {
            for k in 0..dim {
                hessian[(j, k)] /= n;
            }
            if j < n_features {
                hessian[(j, j)] += config.l2 / n;
            }
        }

        let direction = match hessian.cholesky(Side::Lower) {
            Ok(factor) => factor.solve(&grad),
            Err(_) => Mat::from_fn(dim, 1, |j, _| fallback_step * grad[(j, 0)]),
        };

        let mut t = 1.0;
        for halving in 0..=MAX_HALVINGS {
            let candidate = Mat::from_fn(dim, 1, |j, _| theta[(j, 0)] - t * direction[(j, 0)]);
            let candidate_loss = objective(&xa, y, &candidate, config.l2);
            if candidate_loss <= loss || halving == MAX_HALVINGS {
                theta = candidate;
                loss = candidate_loss;
                break;
            }
            t *= 0.5;
        }
        iterations += 1;
    }

    Ok(LogisticModel {
        feature_names,
        weights: (0..n_features).map(|j| theta[(j, 0)]).collect(),
        bias: theta[(n_features, 0)],
        iterations,
        converged,
        final_loss: loss,
    })
}

impl LogisticModel {
    fn weight_column(&self) -> Mat<f64> {
        Mat::from_fn(self.weights.len(), 1, |j, _| self.weights[j])
    }

    /// Linear scores `x·w + b`
    pub fn decision_function(&self, x: &Mat<f64>) -> Result<Vec<f64>> {
        anyhow::ensure!(
            x.ncols() == self.weights.len(),
            "Model expects {} feature column(s), got {}",
            self.weights.len(),
            x.ncols()
        );
        Ok(linear_scores(x, &self.weight_column(), self.bias))
    }

    /// Probability of class 1 for each row
    pub fn predict_proba(&self, x: &Mat<f64>) -> Result<Vec<f64>> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(sigmoid)
            .collect())
    }

    /// Class labels at the 0.5 probability threshold
    pub fn predict(&self, x: &Mat<f64>) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }

    /// Feature weights, largest magnitude first
    pub fn coefficients(&self) -> Vec<(String, f64)> {
        let mut coefs: Vec<(String, f64)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(self.weights.iter().copied())
            .collect();
        coefs.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        coefs
    }
}

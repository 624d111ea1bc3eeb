//! Classification metrics and ROC-AUC for a binary classifier

use anyhow::Result;
use faer::Mat;
use serde::Serialize;

use super::error::PipelineError;
use super::estimator::LogisticModel;

/// Precision/recall/F1 for a single class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: u8,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision/recall/F1
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Counts of the 2x2 confusion matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut cm = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t, p) {
                (0, 0) => cm.true_negative += 1,
                (0, _) => cm.false_positive += 1,
                (_, 0) => cm.false_negative += 1,
                _ => cm.true_positive += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }
}

/// Per-class metrics with accuracy and averages
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    /// Metrics for class 0 then class 1
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
    pub confusion: ConfusionMatrix,
}

/// Everything reported for a held-out set
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub report: ClassificationReport,
    /// `None` when the held-out labels contain a single class
    pub roc_auc: Option<f64>,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn class_metrics(label: u8, tp: usize, fp: usize, fn_: usize) -> ClassMetrics {
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    ClassMetrics {
        label,
        precision,
        recall,
        f1: f1_score(precision, recall),
        support: tp + fn_,
    }
}

/// Build the classification report from true and predicted labels.
///
/// A zero denominator gives 0.0 for that metric.
pub fn classification_report(y_true: &[u8], y_pred: &[u8]) -> Result<ClassificationReport> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::LengthMismatch {
            rows: y_pred.len(),
            labels: y_true.len(),
        }
        .into());
    }

    let cm = ConfusionMatrix::from_labels(y_true, y_pred);
    let negative = class_metrics(0, cm.true_negative, cm.false_negative, cm.false_positive);
    let positive = class_metrics(1, cm.true_positive, cm.false_positive, cm.false_negative);
    let classes = [negative, positive];

    let total = cm.total();
    let macro_avg = AveragedMetrics {
        precision: (negative.precision + positive.precision) / 2.0,
        recall: (negative.recall + positive.recall) / 2.0,
        f1: (negative.f1 + positive.f1) / 2.0,
        support: total,
    };

    let weighted = |f: fn(&ClassMetrics) -> f64| -> f64 {
        if total == 0 {
            0.0
        } else {
            classes
                .iter()
                .map(|c| f(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        }
    };
    let weighted_avg = AveragedMetrics {
        precision: weighted(|c: &ClassMetrics| c.precision),
        recall: weighted(|c: &ClassMetrics| c.recall),
        f1: weighted(|c: &ClassMetrics| c.f1),
        support: total,
    };

    Ok(ClassificationReport {
        classes,
        accuracy: ratio(cm.true_negative + cm.true_positive, total),
        macro_avg,
        weighted_avg,
        confusion: cm,
    })
}

/// Area under the ROC curve via the rank-sum statistic.
///
/// Tied scores share their average rank. Returns `None` when `y_true`
/// holds only one class.
pub fn roc_auc_score(y_true: &[u8], scores: &[f64]) -> Option<f64> {
    let n = y_true.len().min(scores.len());
    let n_pos = y_true[..n].iter().filter(|&&y| y == 1).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && scores[order[j]] == scores[order[i]] {
            j += 1;
        }

        // Ranks are 1-based; the tie group spans ranks i+1..=j
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let positives_in_group = order[i..j].iter().filter(|&&k| y_true[k] == 1).count();
        rank_sum_pos += avg_rank * positives_in_group as f64;

        i = j;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    let u = rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0;
    Some((u / (n_pos * n_neg)).clamp(0.0, 1.0))
}

/// Score a model on a transformed held-out matrix
pub fn evaluate(model: &LogisticModel, x_test: &Mat<f64>, y_test: &[u8]) -> Result<Evaluation> {
    let proba = model.predict_proba(x_test)?;
    let y_pred: Vec<u8> = proba.iter().map(|&p| u8::from(p > 0.5)).collect();

    Ok(Evaluation {
        report: classification_report(y_test, &y_pred)?,
        roc_auc: roc_auc_score(y_test, &proba),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auc_perfect_and_worst() {
        let y = [0, 0, 1, 1];
        assert_eq!(roc_auc_score(&y, &[0.1, 0.2, 0.8, 0.9]), Some(1.0));
        assert_eq!(roc_auc_score(&y, &[0.9, 0.8, 0.2, 0.1]), Some(0.0));
    }

    #[test]
    fn test_auc_all_tied_is_half() {
        let y = [0, 1, 0, 1];
        assert_eq!(roc_auc_score(&y, &[0.5; 4]), Some(0.5));
    }

    #[test]
    fn test_auc_single_class_is_undefined() {
        assert_eq!(roc_auc_score(&[1, 1, 1], &[0.1, 0.5, 0.9]), None);
    }

    #[test]
    fn test_auc_known_value() {
        // 3 of the 4 positive/negative pairs are ordered correctly
        let y = [0, 1, 0, 1];
        let auc = roc_auc_score(&y, &[0.1, 0.3, 0.35, 0.8]).unwrap();
        assert!((auc - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_auc_with_nan_scores_does_not_panic() {
        let y: Vec<u8> = (0..64).map(|i| u8::from(i % 3 == 0)).collect();
        let scores: Vec<f64> = (0..64)
            .map(|i| if i % 5 == 0 { f64::NAN } else { i as f64 / 64.0 })
            .collect();

        let auc = roc_auc_score(&y, &scores).unwrap();
        assert!((0.0..=1.0).contains(&auc));
    }

    #[test]
    fn test_report_zero_division() {
        let report = classification_report(&[0, 0, 1], &[0, 0, 0]).unwrap();
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[1].recall, 0.0);
        assert_eq!(report.classes[1].f1, 0.0);
        assert_eq!(report.classes[1].support, 1);
        assert!((report.accuracy - 2.0 / 3.0).abs() < 1e-12);
    }
}

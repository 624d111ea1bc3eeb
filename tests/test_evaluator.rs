//! Tests for the classification report and ROC-AUC

use creditlens::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_report_matches_hand_computed_metrics() {
    // TN=3 FP=1 FN=1 TP=2
    let y_true = [0, 0, 0, 0, 1, 1, 1];
    let y_pred = [0, 0, 0, 1, 0, 1, 1];

    let report = classification_report(&y_true, &y_pred).unwrap();
    let [neg, pos] = report.classes;

    assert_close(neg.precision, 0.75, 1e-12);
    assert_close(neg.recall, 0.75, 1e-12);
    assert_eq!(neg.support, 4);
    assert_close(pos.precision, 2.0 / 3.0, 1e-12);
    assert_close(pos.recall, 2.0 / 3.0, 1e-12);
    assert_eq!(pos.support, 3);
    assert_close(report.accuracy, 5.0 / 7.0, 1e-12);
    assert_close(report.macro_avg.f1, (0.75 + 2.0 / 3.0) / 2.0, 1e-12);
    assert_close(
        report.weighted_avg.recall,
        (0.75 * 4.0 + 2.0 / 3.0 * 3.0) / 7.0,
        1e-12,
    );
    assert_eq!(
        report.confusion,
        ConfusionMatrix {
            true_negative: 3,
            false_positive: 1,
            false_negative: 1,
            true_positive: 2,
        }
    );
}

#[test]
fn test_zero_denominator_gives_zero() {
    let report = classification_report(&[0, 0, 1], &[0, 0, 0]).unwrap();
    assert_eq!(report.classes[1].precision, 0.0);
    assert_eq!(report.classes[1].recall, 0.0);
    assert_eq!(report.classes[1].f1, 0.0);
}

#[test]
fn test_auc_perfect_random_and_inverted() {
    let y = [0, 0, 1, 1];
    assert_eq!(roc_auc_score(&y, &[0.1, 0.2, 0.8, 0.9]), Some(1.0));
    assert_eq!(roc_auc_score(&y, &[0.9, 0.8, 0.2, 0.1]), Some(0.0));
    assert_eq!(roc_auc_score(&y, &[0.5, 0.5, 0.5, 0.5]), Some(0.5));
}

#[test]
fn test_auc_undefined_for_one_class() {
    assert_eq!(roc_auc_score(&[1, 1, 1], &[0.2, 0.4, 0.9]), None);
}

#[test]
fn test_auc_is_invariant_to_monotone_rescaling() {
    let y = [0, 1, 0, 1, 1, 0, 0, 1];
    let scores = [0.2, 0.7, 0.4, 0.35, 0.9, 0.1, 0.6, 0.8];
    let squashed: Vec<f64> = scores.iter().map(|s| s * s * 10.0 - 3.0).collect();

    assert_eq!(roc_auc_score(&y, &scores), roc_auc_score(&y, &squashed));
}

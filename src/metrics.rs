// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Evaluation metrics for three-class sentiment classification.
//!
//! Implements:
//! - Confusion matrix over (negative, neutral, positive)
//! - Accuracy
//! - Per-class precision, recall, F1
//! - Support-weighted precision, recall, F1

use serde::{Deserialize, Serialize};

use crate::dataset::Sentiment;

/// Confusion matrix for three-class classification.
///
/// Rows are ground truth, columns are predictions, both in
/// (negative, neutral, positive) order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; 3]; 3],
}

impl ConfusionMatrix {
    /// Create from predictions and ground truth labels.
    pub fn from_predictions(predictions: &[Sentiment], ground_truth: &[Sentiment]) -> Self {
        assert_eq!(
            predictions.len(),
            ground_truth.len(),
            "Prediction and ground truth lengths must match"
        );

        let mut matrix = Self::default();
        for (pred, truth) in predictions.iter().zip(ground_truth.iter()) {
            matrix.counts[truth.index()][pred.index()] += 1;
        }
        matrix
    }

    /// Total number of samples.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Number of ground-truth samples of a class.
    pub fn support(&self, class: Sentiment) -> usize {
        self.counts[class.index()].iter().sum()
    }

    /// Accuracy: correct predictions over total.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..3).map(|i| self.counts[i][i]).sum();
        correct as f64 / total as f64
    }

    /// Precision for one class: TP / (TP + FP).
    pub fn precision(&self, class: Sentiment) -> f64 {
        let c = class.index();
        let predicted: usize = (0..3).map(|t| self.counts[t][c]).sum();
        if predicted == 0 {
            return 0.0;
        }
        self.counts[c][c] as f64 / predicted as f64
    }

    /// Recall for one class: TP / (TP + FN).
    pub fn recall(&self, class: Sentiment) -> f64 {
        let support = self.support(class);
        if support == 0 {
            return 0.0;
        }
        let c = class.index();
        self.counts[c][c] as f64 / support as f64
    }

    /// F1 for one class: harmonic mean of precision and recall.
    pub fn f1(&self, class: Sentiment) -> f64 {
        let precision = self.precision(class);
        let recall = self.recall(class);
        let denom = precision + recall;
        if denom == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / denom
    }
}

/// Per-class metrics with support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Aggregate report: accuracy plus support-weighted precision/recall/F1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
    pub per_class: Vec<(Sentiment, ClassMetrics)>,
    pub confusion_matrix: ConfusionMatrix,
}

impl MetricsReport {
    /// Generate a report from predictions and ground truth.
    pub fn from_predictions(predictions: &[Sentiment], ground_truth: &[Sentiment]) -> Self {
        let cm = ConfusionMatrix::from_predictions(predictions, ground_truth);
        let total = cm.total();

        let per_class: Vec<(Sentiment, ClassMetrics)> = Sentiment::ALL
            .into_iter()
            .map(|class| {
                (
                    class,
                    ClassMetrics {
                        precision: cm.precision(class),
                        recall: cm.recall(class),
                        f1: cm.f1(class),
                        support: cm.support(class),
                    },
                )
            })
            .collect();

        let weighted = |value: fn(&ClassMetrics) -> f64| -> f64 {
            if total == 0 {
                return 0.0;
            }
            per_class
                .iter()
                .map(|(_, m)| value(m) * m.support as f64)
                .sum::<f64>()
                / total as f64
        };

        Self {
            accuracy: cm.accuracy(),
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
            per_class,
            confusion_matrix: cm,
        }
    }

    /// Format as a human-readable string.
    pub fn format(&self) -> String {
        let mut output = format!(
            r#"Classification Report
=====================
Accuracy:           {:.4} ({:.2}%)
Weighted Precision: {:.4}
Weighted Recall:    {:.4}
Weighted F1:        {:.4}
Support:            {}

Per-Class Metrics:
"#,
            self.accuracy,
            self.accuracy * 100.0,
            self.precision,
            self.recall,
            self.f1,
            self.support,
        );

        for (class, metrics) in &self.per_class {
            output.push_str(&format!(
                "  {}: P={:.4} R={:.4} F1={:.4} (n={})\n",
                class.as_str(),
                metrics.precision,
                metrics.recall,
                metrics.f1,
                metrics.support
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use Sentiment::{Negative, Neutral, Positive};

    #[test]
    fn test_perfect_predictions() {
        let truth = vec![Negative, Neutral, Positive, Positive];
        let report = MetricsReport::from_predictions(&truth, &truth);

        assert!((report.accuracy - 1.0).abs() < 1e-9);
        assert!((report.precision - 1.0).abs() < 1e-9);
        assert!((report.recall - 1.0).abs() < 1e-9);
        assert!((report.f1 - 1.0).abs() < 1e-9);
        assert_eq!(report.support, 4);
    }

    #[test]
    fn test_all_wrong_predictions() {
        let predictions = vec![Positive, Positive, Negative, Negative];
        let truth = vec![Negative, Neutral, Positive, Positive];
        let report = MetricsReport::from_predictions(&predictions, &truth);

        assert!(report.accuracy.abs() < 1e-9);
        assert!(report.f1.abs() < 1e-9);
    }

    #[test]
    fn test_per_class_counts() {
        // truth: 2 negative, 1 neutral, 1 positive
        let predictions = vec![Negative, Neutral, Neutral, Positive];
        let truth = vec![Negative, Negative, Neutral, Positive];
        let cm = ConfusionMatrix::from_predictions(&predictions, &truth);

        assert_eq!(cm.total(), 4);
        assert_eq!(cm.support(Negative), 2);
        assert_eq!(cm.support(Neutral), 1);
        assert_eq!(cm.support(Positive), 1);
        assert!((cm.accuracy() - 0.75).abs() < 1e-9);
        // neutral was predicted twice, once correctly
        assert!((cm.precision(Neutral) - 0.5).abs() < 1e-9);
        assert!((cm.recall(Neutral) - 1.0).abs() < 1e-9);
        assert!((cm.recall(Negative) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_average_uses_support() {
        // everything predicted negative; negative support 3, positive support 1
        let predictions = vec![Negative, Negative, Negative, Negative];
        let truth = vec![Negative, Negative, Negative, Positive];
        let report = MetricsReport::from_predictions(&predictions, &truth);

        // weighted precision = (3 * (3/4) + 1 * 0) / 4
        assert!((report.precision - 0.5625).abs() < 1e-9);
        // weighted recall = (3 * 1.0 + 1 * 0.0) / 4
        assert!((report.recall - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_stay_in_unit_interval() {
        let predictions = vec![Positive, Negative, Neutral, Positive, Negative];
        let truth = vec![Negative, Negative, Positive, Positive, Neutral];
        let report = MetricsReport::from_predictions(&predictions, &truth);

        for value in [report.accuracy, report.precision, report.recall, report.f1] {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_report_format() {
        let truth = vec![Negative, Neutral, Positive];
        let report = MetricsReport::from_predictions(&truth, &truth);
        let formatted = report.format();

        assert!(formatted.contains("Classification Report"));
        assert!(formatted.contains("Weighted Precision"));
        assert!(formatted.contains("negative"));
    }
}

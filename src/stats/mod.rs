//! Evaluation metrics for the held-out split.
//!
//! Accuracy, per-class precision/recall/F1 with support, macro and
//! support-weighted averages, and the confusion matrix.

use crate::classifier::{ClassificationError, Label};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Precision, recall, F1 and support of one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Summary of predictions against ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    /// Indexed by label value: `[non-coding, coding]`.
    pub per_class: [ClassMetrics; 2],
    /// Rows are true labels, columns predicted labels, both in `Label::ALL` order.
    pub confusion: Array2<usize>,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ClassificationReport {
    /// Builds the report from paired true and predicted labels.
    pub fn from_predictions(
        y_true: &[Label],
        y_pred: &[Label],
    ) -> Result<Self, ClassificationError> {
        if y_true.len() != y_pred.len() {
            return Err(ClassificationError::LabelCountMismatch {
                rows: y_pred.len(),
                labels: y_true.len(),
            });
        }

        let mut confusion = Array2::<usize>::zeros((2, 2));
        for (&t, &p) in y_true.iter().zip(y_pred) {
            confusion[[t.as_u8() as usize, p.as_u8() as usize]] += 1;
        }

        let per_class = [0usize, 1].map(|c| {
            let tp = confusion[[c, c]];
            let predicted = confusion.column(c).sum();
            let support = confusion.row(c).sum();
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            ClassMetrics {
                precision,
                recall,
                f1,
                support,
            }
        });

        let correct = confusion[[0, 0]] + confusion[[1, 1]];
        Ok(ClassificationReport {
            accuracy: ratio(correct, y_true.len()),
            per_class,
            confusion,
        })
    }

    pub fn total_support(&self) -> usize {
        self.per_class.iter().map(|m| m.support).sum()
    }

    pub fn macro_avg(&self) -> (f64, f64, f64) {
        let [a, b] = self.per_class;
        (
            (a.precision + b.precision) / 2.0,
            (a.recall + b.recall) / 2.0,
            (a.f1 + b.f1) / 2.0,
        )
    }

    pub fn weighted_avg(&self) -> (f64, f64, f64) {
        let total = self.total_support();
        if total == 0 {
            return (0.0, 0.0, 0.0);
        }
        let weight = |m: &ClassMetrics| m.support as f64 / total as f64;
        self.per_class.iter().fold((0.0, 0.0, 0.0), |acc, m| {
            (
                acc.0 + weight(m) * m.precision,
                acc.1 + weight(m) * m.recall,
                acc.2 + weight(m) * m.f1,
            )
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, m) in Label::ALL.iter().zip(self.per_class.iter()) {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                label.as_u8(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        writeln!(f)?;
        let total = self.total_support();
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, total
        )?;
        let (p, r, f1) = self.macro_avg();
        writeln!(
            f,
            "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "macro avg", p, r, f1, total
        )?;
        let (p, r, f1) = self.weighted_avg();
        writeln!(
            f,
            "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "weighted avg", p, r, f1, total
        )
    }
}

/// Renders a confusion matrix as `[[a b]\n [c d]]`.
pub fn format_confusion(confusion: &Array2<usize>) -> String {
    let rows: Vec<String> = confusion
        .rows()
        .into_iter()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            format!("[{}]", cells.join(" "))
        })
        .collect();
    format!("[{}]", rows.join("\n "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::classifier::Label::{Coding as C, NonCoding as N};

    #[test]
    fn test_report_counts() {
        let y_true = [N, N, N, C, C, C, C];
        let y_pred = [N, C, N, C, C, N, C];
        let report = ClassificationReport::from_predictions(&y_true, &y_pred).unwrap();

        assert_eq!(report.confusion[[0, 0]], 2);
        assert_eq!(report.confusion[[0, 1]], 1);
        assert_eq!(report.confusion[[1, 0]], 1);
        assert_eq!(report.confusion[[1, 1]], 3);
        assert_relative_eq!(report.accuracy, 5.0 / 7.0);

        let non_coding = report.per_class[0];
        assert_relative_eq!(non_coding.precision, 2.0 / 3.0);
        assert_relative_eq!(non_coding.recall, 2.0 / 3.0);
        assert_eq!(non_coding.support, 3);

        let coding = report.per_class[1];
        assert_relative_eq!(coding.precision, 0.75);
        assert_relative_eq!(coding.recall, 0.75);
        assert_relative_eq!(coding.f1, 0.75);
        assert_eq!(coding.support, 4);

        let (_, _, weighted_f1) = report.weighted_avg();
        assert_relative_eq!(weighted_f1, (3.0 * (2.0 / 3.0) + 4.0 * 0.75) / 7.0);
    }

    #[test]
    fn test_class_never_predicted_has_zero_precision() {
        let report = ClassificationReport::from_predictions(&[N, C], &[N, N]).unwrap();
        assert_eq!(report.per_class[1].precision, 0.0);
        assert_eq!(report.per_class[1].f1, 0.0);
        assert_relative_eq!(report.per_class[0].precision, 0.5);
    }

    #[test]
    fn test_empty_predictions() {
        let report = ClassificationReport::from_predictions(&[], &[]).unwrap();
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.total_support(), 0);
        assert_eq!(report.weighted_avg(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_display_layout() {
        let report = ClassificationReport::from_predictions(&[N, C], &[N, C]).unwrap();
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("accuracy"));
        assert!(text.contains("weighted avg"));
        assert_eq!(format_confusion(&report.confusion), "[[1 0]\n [0 1]]");
    }

    #[test]
    fn test_unpaired_labels_are_rejected() {
        let result = ClassificationReport::from_predictions(&[N, C, C], &[N, C]);
        assert!(matches!(
            result,
            Err(ClassificationError::LabelCountMismatch { rows: 2, labels: 3 })
        ));
    }
}

//! Binary confusion counts and percentage accuracy.

use std::fmt;

use serde::Serialize;

use crate::error::RfError;

/// Label treated as the positive class by [`AccuracyMetrics`].
pub const POSITIVE_LABEL: usize = 1;

/// Binary confusion counts with accuracy on the 0–100 scale.
///
/// A prediction equal to [`POSITIVE_LABEL`] is positive; any other label is
/// negative. A correct positive prediction is a true positive, a correct
/// negative one a true negative, and so on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    /// Correct predictions of the positive label.
    pub true_positives: usize,
    /// Correct predictions of a negative label.
    pub true_negatives: usize,
    /// Incorrect predictions of the positive label.
    pub false_positives: usize,
    /// Incorrect predictions of a negative label.
    pub false_negatives: usize,
    /// Percentage of correct predictions, in `[0, 100]`.
    pub accuracy: f64,
}

impl AccuracyMetrics {
    /// Tally confusion counts from true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero labels provided |
    /// | [`RfError::LabelCountMismatch`] | The slices differ in length |
    pub fn from_labels(true_labels: &[usize], predicted: &[usize]) -> Result<Self, RfError> {
        if true_labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if true_labels.len() != predicted.len() {
            return Err(RfError::LabelCountMismatch {
                n_samples: true_labels.len(),
                n_labels: predicted.len(),
            });
        }
        let mut metrics = Self::default();
        for (&truth, &pred) in true_labels.iter().zip(predicted) {
            match (pred == truth, pred == POSITIVE_LABEL) {
                (true, true) => metrics.true_positives += 1,
                (true, false) => metrics.true_negatives += 1,
                (false, true) => metrics.false_positives += 1,
                (false, false) => metrics.false_negatives += 1,
            }
        }
        metrics.accuracy = metrics.percentage();
        Ok(metrics)
    }

    /// Total number of predictions counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    fn percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            100.0 * (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }
}

impl fmt::Display for AccuracyMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} {:>8} {:>8}", "", "pred_1", "pred_0")?;
        writeln!(
            f,
            "{:>10} {:>8} {:>8}",
            "correct", self.true_positives, self.true_negatives
        )?;
        writeln!(
            f,
            "{:>10} {:>8} {:>8}",
            "incorrect", self.false_positives, self.false_negatives
        )?;
        write!(f, "accuracy: {:.2}%", self.accuracy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let labels = vec![0, 1, 1, 0];
        let metrics = AccuracyMetrics::from_labels(&labels, &labels).unwrap();
        assert_eq!(metrics.true_positives, 2);
        assert_eq!(metrics.true_negatives, 2);
        assert!((metrics.accuracy - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn known_counts() {
        // truth: 1 1 0 0 1 0 0 0
        // pred:  1 0 1 0 1 0 0 1
        let truth = vec![1, 1, 0, 0, 1, 0, 0, 0];
        let pred = vec![1, 0, 1, 0, 1, 0, 0, 1];
        let m = AccuracyMetrics::from_labels(&truth, &pred).unwrap();
        assert_eq!(m.true_positives, 2);
        assert_eq!(m.true_negatives, 3);
        assert_eq!(m.false_positives, 2);
        assert_eq!(m.false_negatives, 1);
        assert_eq!(m.total(), 8);
        assert!((m.accuracy - 62.5).abs() < 1e-10);
    }

    #[test]
    fn non_binary_labels_count_as_negative() {
        let m = AccuracyMetrics::from_labels(&[2, 2], &[2, 0]).unwrap();
        assert_eq!(m.true_negatives, 1);
        assert_eq!(m.false_negatives, 1);
        assert!((m.accuracy - 50.0).abs() < 1e-10);
    }

    #[test]
    fn empty_labels_error() {
        let err = AccuracyMetrics::from_labels(&[], &[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn length_mismatch_error() {
        let err = AccuracyMetrics::from_labels(&[0, 1], &[0]).unwrap_err();
        assert!(matches!(err, RfError::LabelCountMismatch { .. }));
    }

    #[test]
    fn display_formatting() {
        let m = AccuracyMetrics::from_labels(&[0, 1], &[0, 1]).unwrap();
        let output = format!("{m}");
        assert!(output.contains("pred_1"));
        assert!(output.ends_with("accuracy: 100.00%"));
    }
}

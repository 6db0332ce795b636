//! Validated labeled datasets.

use crate::error::RfError;

/// A rectangular, finite, labeled dataset.
///
/// Feature rows and labels are stored in parallel vectors: `labels[i]` is the
/// class of `features[i]`. Every row has the same width.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    n_features: usize,
}

impl Dataset {
    /// Build a dataset from rows whose last element is the class label.
    ///
    /// # Errors
    ///
    /// | Variant                            | When                                         |
    /// |------------------------------------|----------------------------------------------|
    /// | [`RfError::EmptyDataset`]          | `rows` is empty                              |
    /// | [`RfError::ZeroFeatures`]          | rows have fewer than two columns             |
    /// | [`RfError::FeatureCountMismatch`]  | rows have inconsistent lengths               |
    /// | [`RfError::NonFiniteValue`]        | any value is NaN or infinite                 |
    /// | [`RfError::InvalidLabel`]          | a label is negative or not an integer        |
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, RfError> {
        let Some(first) = rows.first() else {
            return Err(RfError::EmptyDataset);
        };
        if first.len() < 2 {
            return Err(RfError::ZeroFeatures);
        }
        let n_features = first.len() - 1;

        let mut features = Vec::with_capacity(rows.len());
        let mut labels = Vec::with_capacity(rows.len());
        for (sample_index, row) in rows.iter().enumerate() {
            if row.len() != n_features + 1 {
                return Err(RfError::FeatureCountMismatch {
                    expected: n_features,
                    got: row.len().saturating_sub(1),
                    sample_index,
                });
            }
            let (values, label) = row.split_at(n_features);
            labels.push(parse_label(label[0], sample_index, n_features)?);
            features.push(values.to_vec());
        }

        Self::new(features, labels)
    }

    /// Build a dataset from separated feature rows and labels.
    ///
    /// # Errors
    ///
    /// Same as [`Dataset::from_rows`], plus [`RfError::LabelCountMismatch`]
    /// when `labels.len() != features.len()`.
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self, RfError> {
        if features.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if labels.len() != features.len() {
            return Err(RfError::LabelCountMismatch {
                n_samples: features.len(),
                n_labels: labels.len(),
            });
        }
        let n_features = features[0].len();
        if n_features == 0 {
            return Err(RfError::ZeroFeatures);
        }
        for (sample_index, row) in features.iter().enumerate() {
            if row.len() != n_features {
                return Err(RfError::FeatureCountMismatch {
                    expected: n_features,
                    got: row.len(),
                    sample_index,
                });
            }
            if let Some(column) = row.iter().position(|v| !v.is_finite()) {
                return Err(RfError::NonFiniteValue {
                    sample_index,
                    column,
                });
            }
        }
        Ok(Self {
            features,
            labels,
            n_features,
        })
    }

    /// Copy the samples at `indices` into a new dataset.
    ///
    /// The result may be empty; it keeps the feature width of `self`.
    /// Indices may repeat.
    ///
    /// # Panics
    ///
    /// Panics if any index is `>= self.n_samples()`.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            n_features: self.n_features,
        }
    }

    /// Return the feature rows.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the class labels.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the feature row and label of one sample.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.n_samples()`.
    #[must_use]
    pub fn sample(&self, index: usize) -> (&[f64], usize) {
        (&self.features[index], self.labels[index])
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Return the number of feature columns (label excluded).
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return `true` if the dataset holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Convert a label cell to a class index. `column` is the label's column position.
fn parse_label(value: f64, sample_index: usize, column: usize) -> Result<usize, RfError> {
    if !value.is_finite() {
        return Err(RfError::NonFiniteValue {
            sample_index,
            column,
        });
    }
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(RfError::InvalidLabel {
            sample_index,
            value,
        });
    }
    Ok(value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_splits_label_column() {
        let ds = Dataset::from_rows(&[vec![1.0, 2.0, 0.0], vec![3.0, 4.0, 1.0]]).unwrap();
        assert_eq!(ds.n_samples(), 2);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.labels(), &[0, 1]);
        assert_eq!(ds.sample(1), (&[3.0, 4.0][..], 1));
    }

    #[test]
    fn empty_rows_error() {
        let err = Dataset::from_rows(&[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn label_only_rows_error() {
        let err = Dataset::from_rows(&[vec![1.0], vec![0.0]]).unwrap_err();
        assert!(matches!(err, RfError::ZeroFeatures));
    }

    #[test]
    fn ragged_rows_error() {
        let err = Dataset::from_rows(&[vec![1.0, 2.0, 0.0], vec![1.0, 0.0]]).unwrap_err();
        assert!(matches!(
            err,
            RfError::FeatureCountMismatch {
                expected: 2,
                got: 1,
                sample_index: 1
            }
        ));
    }

    #[test]
    fn fractional_label_error() {
        let err = Dataset::from_rows(&[vec![1.0, 0.5]]).unwrap_err();
        assert!(matches!(err, RfError::InvalidLabel { sample_index: 0, .. }));
    }

    #[test]
    fn negative_label_error() {
        let err = Dataset::from_rows(&[vec![1.0, 0.0], vec![1.0, -1.0]]).unwrap_err();
        assert!(matches!(err, RfError::InvalidLabel { sample_index: 1, .. }));
    }

    #[test]
    fn non_finite_feature_error() {
        let err = Dataset::from_rows(&[vec![f64::INFINITY, 0.0]]).unwrap_err();
        assert!(matches!(
            err,
            RfError::NonFiniteValue {
                sample_index: 0,
                column: 0
            }
        ));
    }

    #[test]
    fn label_count_mismatch_error() {
        let err = Dataset::new(vec![vec![1.0], vec![2.0]], vec![0]).unwrap_err();
        assert!(matches!(err, RfError::LabelCountMismatch { .. }));
    }

    #[test]
    fn subset_copies_selected_samples() {
        let ds = Dataset::from_rows(&[vec![1.0, 0.0], vec![2.0, 1.0], vec![3.0, 0.0]]).unwrap();
        let sub = ds.subset(&[2, 0, 2]);
        assert_eq!(sub.n_samples(), 3);
        assert_eq!(sub.features(), &[vec![3.0], vec![1.0], vec![3.0]]);
        assert_eq!(sub.labels(), &[0, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn subset_out_of_range_panics() {
        let ds = Dataset::from_rows(&[vec![1.0, 0.0]]).unwrap();
        let _ = ds.subset(&[1]);
    }

    #[test]
    #[should_panic]
    fn sample_out_of_range_panics() {
        let ds = Dataset::from_rows(&[vec![1.0, 0.0]]).unwrap();
        let _ = ds.sample(1);
    }

    #[test]
    fn empty_subset_keeps_width() {
        let ds = Dataset::from_rows(&[vec![1.0, 2.0, 0.0]]).unwrap();
        let sub = ds.subset(&[]);
        assert!(sub.is_empty());
        assert_eq!(sub.n_features(), 2);
    }
}

/// Broad classification of [`RfError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied malformed data or an invalid parameter.
    InvalidInput,
    /// Training could not produce a labeled leaf for every path.
    IncompleteModel,
}

/// Errors from decision tree, forest, and cross-validation operations.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when n_folds is less than 2.
    #[error("n_folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The invalid n_folds value provided.
        n_folds: usize,
    },

    /// Returned when the held-out fraction is not in [0.0, 1.0).
    #[error("test_fraction must be in [0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },

    /// Returned when a feature subset is empty or names a column that does not exist.
    #[error("feature subset {subset:?} is invalid for {n_features} feature columns")]
    InvalidFeatureSubset {
        /// The requested feature indices.
        subset: Vec<usize>,
        /// The number of feature columns in the dataset.
        n_features: usize,
    },

    /// Returned when a dataset has zero samples.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when the rows carry a label but no feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a row has a different width than the first row.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when the number of labels does not match the number of feature rows.
    #[error("got {n_labels} labels for {n_samples} samples")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_samples: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when a feature vector has the wrong width at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when a value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, column {column}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending column.
        column: usize,
    },

    /// Returned when a label column value is not a non-negative integer.
    #[error("sample {sample_index} has label {value}, expected a non-negative integer")]
    InvalidLabel {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The raw label value.
        value: f64,
    },

    /// Returned when the held-out split leaves nothing to train on.
    #[error("training split is empty: {n_samples} samples with test_fraction {test_fraction}")]
    EmptyTrainingSplit {
        /// Number of samples passed to training.
        n_samples: usize,
        /// The held-out fraction in effect.
        test_fraction: f64,
    },

    /// Returned when there are fewer samples than folds.
    #[error("{n_samples} samples cannot be split into {n_folds} folds")]
    TooFewSamplesForFolds {
        /// Number of samples in the dataset.
        n_samples: usize,
        /// The requested number of folds.
        n_folds: usize,
    },

    /// Returned when tree construction reaches a range with no samples.
    #[error("tree construction reached an empty sample range at depth {depth}")]
    IncompleteModel {
        /// Depth of the node that received no samples.
        depth: usize,
    },
}

impl RfError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RfError::IncompleteModel { .. } => ErrorKind::IncompleteModel,
            _ => ErrorKind::InvalidInput,
        }
    }
}

//! Training result types for random forests.

use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::RfError;
use crate::forest::RandomForest;

/// Metadata about the training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingMetadata {
    /// Number of trees trained.
    pub n_trees: usize,
    /// Number of samples passed to training.
    pub n_samples: usize,
    /// Size of the training split.
    pub n_train: usize,
    /// Size of the held-out split.
    pub n_held_out: usize,
    /// Number of feature columns.
    pub n_features: usize,
    /// Bootstrap sample size of each tree, in training order.
    pub bootstrap_sizes: Vec<usize>,
}

/// Result of random forest training.
///
/// Contains the fitted forest, the held-out samples that were kept out of
/// every bootstrap, and training metadata.
#[derive(Debug)]
pub struct RandomForestResult {
    forest: RandomForest,
    held_out: Dataset,
    metadata: TrainingMetadata,
}

impl RandomForestResult {
    /// Create a new training result.
    pub(crate) fn new(forest: RandomForest, held_out: Dataset, metadata: TrainingMetadata) -> Self {
        Self {
            forest,
            held_out,
            metadata,
        }
    }

    /// Borrow the fitted forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Consume the result and return the fitted forest.
    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Return the held-out split.
    #[must_use]
    pub fn held_out(&self) -> &Dataset {
        &self.held_out
    }

    /// Return training metadata.
    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }

    /// Score the forest on its held-out split (0–1 scale).
    ///
    /// # Errors
    ///
    /// Returns [`RfError::EmptyDataset`] when nothing was held out.
    pub fn evaluate_held_out(&self) -> Result<f64, RfError> {
        self.forest.evaluate(&self.held_out)
    }
}

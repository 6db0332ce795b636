//! Configuration builder for random forest training.

use crate::dataset::Dataset;
use crate::error::RfError;
use crate::eval::{CrossValidation, CrossValidationResult};
use crate::result::RandomForestResult;

/// Configuration for random forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `seed`          | 42      |
/// | `test_fraction` | 0.2     |
///
/// Every tree sees all feature columns; only rows are resampled.
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) seed: u64,
    pub(crate) test_fraction: f64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            seed: 42,
            test_fraction: 0.2,
        })
    }

    /// Set the random seed for the held-out split and bootstrap draws.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the fraction of the input held out from training.
    ///
    /// Checked at training time; must be in `[0.0, 1.0)`.
    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the held-out fraction.
    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    pub(crate) fn validate(&self) -> Result<(), RfError> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(RfError::InvalidTestFraction {
                fraction: self.test_fraction,
            });
        }
        Ok(())
    }

    /// Train a random forest on `dataset`.
    ///
    /// The input is shuffled and split into a training part and a held-out
    /// part (`test_fraction`). Each tree is trained on a bootstrap sample of
    /// the training part, the same size as that part. The held-out part is
    /// returned in the result but not scored.
    ///
    /// # Errors
    ///
    /// | Variant                            | When                                         |
    /// |------------------------------------|----------------------------------------------|
    /// | [`RfError::EmptyDataset`]          | `dataset` has no samples                     |
    /// | [`RfError::InvalidTestFraction`]   | `test_fraction` is outside `[0.0, 1.0)`      |
    /// | [`RfError::EmptyTrainingSplit`]    | the training part would have no samples      |
    pub fn train(&self, dataset: &Dataset) -> Result<RandomForestResult, RfError> {
        crate::forest::train(self, dataset)
    }

    /// Run k-fold cross-validation of this configuration.
    ///
    /// Folds are shuffled with this config's seed; the fold forests are
    /// seeded from a separate stream derived from it, as in
    /// [`CrossValidation::perform`].
    ///
    /// # Errors
    ///
    /// See [`CrossValidation::new`] and [`CrossValidation::evaluate`].
    pub fn cross_validate(
        &self,
        dataset: &Dataset,
        n_folds: usize,
    ) -> Result<CrossValidationResult, RfError> {
        let cv = CrossValidation::new(n_folds)?.with_seed(self.seed);
        let forest_config = self.clone().with_seed(cv.forest_seed());
        cv.evaluate(&forest_config, dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RandomForestConfig::new(10).unwrap();
        assert_eq!(config.n_trees(), 10);
        assert_eq!(config.seed(), 42);
        assert!((config.test_fraction() - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_tree_count_error() {
        assert!(matches!(
            RandomForestConfig::new(0),
            Err(RfError::InvalidTreeCount { n_trees: 0 })
        ));
    }

    #[test]
    fn invalid_test_fraction_rejected() {
        for fraction in [-0.1, 1.0, f64::NAN] {
            let config = RandomForestConfig::new(1)
                .unwrap()
                .with_test_fraction(fraction);
            assert!(matches!(
                config.validate(),
                Err(RfError::InvalidTestFraction { .. })
            ));
        }
    }
}

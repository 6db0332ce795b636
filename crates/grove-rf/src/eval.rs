//! K-fold cross-validation for random forests.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::dataset::Dataset;
use crate::error::RfError;

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// Results of k-fold cross-validation.
#[derive(Debug, Clone, Serialize)]
pub struct CrossValidationResult {
    /// Held-out accuracy for each fold (0–1 scale).
    pub fold_accuracies: Vec<f64>,
    /// Number of test samples in each fold.
    pub fold_sizes: Vec<usize>,
    /// Mean accuracy across folds.
    pub mean_accuracy: f64,
    /// Population standard deviation of fold accuracies.
    pub std_accuracy: f64,
    /// Number of folds.
    pub n_folds: usize,
    /// Total number of samples.
    pub n_samples: usize,
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, RfError> {
        if n_folds < 2 {
            return Err(RfError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the random seed for fold shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Partition `0..n_samples` into folds.
    ///
    /// The indices are shuffled once, then cut into `n_folds` contiguous
    /// runs of `n_samples / n_folds`; the last fold also takes the
    /// remainder.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::TooFewSamplesForFolds`] if `n_samples < n_folds`.
    pub fn folds(&self, n_samples: usize) -> Result<Vec<Vec<usize>>, RfError> {
        if n_samples < self.n_folds {
            return Err(RfError::TooFewSamplesForFolds {
                n_samples,
                n_folds: self.n_folds,
            });
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut permutation: Vec<usize> = (0..n_samples).collect();
        permutation.shuffle(&mut rng);

        let fold_size = n_samples / self.n_folds;
        let folds = (0..self.n_folds)
            .map(|fold| {
                let start = fold * fold_size;
                let end = if fold == self.n_folds - 1 {
                    n_samples
                } else {
                    start + fold_size
                };
                permutation[start..end].to_vec()
            })
            .collect();
        Ok(folds)
    }

    /// Run k-fold cross-validation of a forest configuration.
    ///
    /// Each fold in turn is the test set; a fresh forest is trained on the
    /// remaining folds and scored on it. Fold `i` trains with seed
    /// `config.seed() + i`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero samples |
    /// | [`RfError::TooFewSamplesForFolds`] | Fewer samples than folds |
    /// | [`RfError::EmptyTrainingSplit`] | A fold's training part is emptied by `config`'s held-out split |
    /// | Other forest errors | From underlying training |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = dataset.n_samples()))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        dataset: &Dataset,
    ) -> Result<CrossValidationResult, RfError> {
        if dataset.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        let n_samples = dataset.n_samples();
        let folds = self.folds(n_samples)?;

        let mut fold_accuracies = Vec::with_capacity(self.n_folds);
        let mut fold_sizes = Vec::with_capacity(self.n_folds);

        for (fold, test_indices) in folds.iter().enumerate() {
            let train_indices: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != fold)
                .flat_map(|(_, indices)| indices.iter().copied())
                .collect();
            let train_set = dataset.subset(&train_indices);
            let test_set = dataset.subset(test_indices);

            let fold_config = config
                .clone()
                .with_seed(config.seed.wrapping_add(fold as u64));
            let result = fold_config.train(&train_set)?;
            let fold_accuracy = result.forest().evaluate(&test_set)?;

            info!(
                fold,
                n_train = train_set.n_samples(),
                n_test = test_set.n_samples(),
                accuracy = fold_accuracy,
                "fold completed"
            );
            fold_accuracies.push(fold_accuracy);
            fold_sizes.push(test_set.n_samples());
        }

        let mean_accuracy = fold_accuracies.iter().sum::<f64>() / self.n_folds as f64;
        let std_accuracy = {
            let variance = fold_accuracies
                .iter()
                .map(|&a| (a - mean_accuracy).powi(2))
                .sum::<f64>()
                / self.n_folds as f64;
            variance.sqrt()
        };

        info!(mean_accuracy, std_accuracy, "cross-validation complete");

        Ok(CrossValidationResult {
            fold_accuracies,
            fold_sizes,
            mean_accuracy,
            std_accuracy,
            n_folds: self.n_folds,
            n_samples,
        })
    }

    /// Cross-validate a forest of `n_trees` trees seeded from this config.
    ///
    /// The forest seed is drawn from a separate ChaCha stream keyed by this
    /// config's seed, so forest training never replays the fold shuffle.
    ///
    /// Every fold's training part is split again by the forest's default
    /// held-out fraction (0.2), so each fold's complement needs at least two
    /// samples. With fewer, as with 3 samples in 2 folds, the call fails
    /// with [`RfError::EmptyTrainingSplit`] even though `n_samples >= n_folds`.
    ///
    /// # Errors
    ///
    /// [`RfError::InvalidTreeCount`] if `n_trees` is zero, otherwise as
    /// [`CrossValidation::evaluate`].
    pub fn perform(&self, dataset: &Dataset, n_trees: usize) -> Result<CrossValidationResult, RfError> {
        let config = RandomForestConfig::new(n_trees)?.with_seed(self.forest_seed());
        self.evaluate(&config, dataset)
    }

    pub(crate) fn forest_seed(&self) -> u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(1);
        rng.r#gen()
    }
}

/// Mean k-fold accuracy of an `n_trees` forest on `dataset`, in `[0, 1]`.
///
/// Needs enough samples that every fold's training part survives the
/// forest's 80/20 held-out split; see [`CrossValidation::perform`].
///
/// # Errors
///
/// See [`CrossValidation::new`] and [`CrossValidation::perform`].
pub fn cross_validate(
    dataset: &Dataset,
    n_folds: usize,
    n_trees: usize,
    seed: u64,
) -> Result<f64, RfError> {
    let result = CrossValidation::new(n_folds)?
        .with_seed(seed)
        .perform(dataset, n_trees)?;
    Ok(result.mean_accuracy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_separable_data(n_per_class: usize) -> Dataset {
        let mut rows = Vec::new();
        for i in 0..n_per_class {
            rows.push(vec![i as f64 * 0.1, 0.5, 0.0]);
        }
        for i in 0..n_per_class {
            rows.push(vec![10.0 + i as f64 * 0.1, 0.5, 1.0]);
        }
        Dataset::from_rows(&rows).unwrap()
    }

    #[test]
    fn folds_cover_every_index_once() {
        let cv = CrossValidation::new(4).unwrap().with_seed(9);
        let folds = cv.folds(23).unwrap();
        assert_eq!(folds.len(), 4);
        let sizes: Vec<usize> = folds.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 5, 5, 8]);

        let mut all: Vec<usize> = folds.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn folds_are_deterministic_per_seed() {
        let a = CrossValidation::new(3).unwrap().with_seed(1).folds(12).unwrap();
        let b = CrossValidation::new(3).unwrap().with_seed(1).folds(12).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_fold_count() {
        assert!(CrossValidation::new(0).is_err());
        assert!(CrossValidation::new(1).is_err());
    }

    #[test]
    fn too_few_samples_for_folds() {
        let data = make_separable_data(2);
        let cv = CrossValidation::new(5).unwrap();
        let err = cv.perform(&data, 3).unwrap_err();
        assert!(matches!(
            err,
            RfError::TooFewSamplesForFolds {
                n_samples: 4,
                n_folds: 5
            }
        ));
    }

    #[test]
    fn forest_seed_is_deterministic_and_distinct() {
        let cv = CrossValidation::new(2).unwrap().with_seed(42);
        assert_eq!(cv.forest_seed(), cv.forest_seed());
        assert_ne!(cv.forest_seed(), 42);
        assert_ne!(
            cv.forest_seed(),
            CrossValidation::new(2).unwrap().with_seed(43).forest_seed()
        );
    }

    #[test]
    fn config_cross_validate_matches_perform() {
        let data = make_separable_data(10);
        let via_config = RandomForestConfig::new(3)
            .unwrap()
            .with_seed(7)
            .cross_validate(&data, 4)
            .unwrap();
        let via_perform = CrossValidation::new(4)
            .unwrap()
            .with_seed(7)
            .perform(&data, 3)
            .unwrap();
        assert_eq!(via_config.fold_accuracies, via_perform.fold_accuracies);
    }

    #[test]
    fn small_fold_complement_is_empty_training_split() {
        // Fold sizes 1 and 2: the second fold trains on 1 sample, which the
        // 80/20 held-out split reduces to 0.
        let data = Dataset::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 0.0]]).unwrap();
        let err = cross_validate(&data, 2, 3, 42).unwrap_err();
        assert!(matches!(
            err,
            RfError::EmptyTrainingSplit { n_samples: 1, .. }
        ));
    }

    #[test]
    fn five_fold_separable_accuracy() {
        let data = make_separable_data(30);
        let result = CrossValidation::new(5)
            .unwrap()
            .with_seed(42)
            .perform(&data, 10)
            .unwrap();
        assert_eq!(result.fold_accuracies.len(), 5);
        assert_eq!(result.fold_sizes, vec![12; 5]);
        assert_eq!(result.n_samples, 60);
        assert!(
            result.mean_accuracy > 0.8,
            "mean_accuracy = {}",
            result.mean_accuracy
        );
    }

    #[test]
    fn config_cross_validate_uses_config_trees() {
        let data = make_separable_data(15);
        let config = RandomForestConfig::new(4).unwrap().with_seed(3);
        let result = config.cross_validate(&data, 3).unwrap();
        assert_eq!(result.n_folds, 3);
        assert_eq!(result.fold_sizes.iter().sum::<usize>(), 30);
    }

    #[test]
    fn free_function_returns_mean() {
        let data = make_separable_data(20);
        let mean = cross_validate(&data, 4, 5, 42).unwrap();
        let result = CrossValidation::new(4)
            .unwrap()
            .with_seed(42)
            .perform(&data, 5)
            .unwrap();
        assert!((mean - result.mean_accuracy).abs() < f64::EPSILON);
        assert!((0.0..=1.0).contains(&mean));
    }
}

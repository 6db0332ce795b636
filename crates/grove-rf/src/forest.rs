//! Bagged random forest: training, majority-vote prediction, and evaluation.

use std::collections::BTreeMap;

use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::dataset::Dataset;
use crate::error::RfError;
use crate::metrics::AccuracyMetrics;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// A fitted random forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
}

/// Draw `n_samples` indices uniformly from `0..n_samples`, with replacement.
fn bootstrap_sample(n_samples: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Train the forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = dataset.n_samples()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    dataset: &Dataset,
) -> Result<RandomForestResult, RfError> {
    if dataset.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    config.validate()?;

    let n_samples = dataset.n_samples();
    let n_features = dataset.n_features();
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);

    // Randomized train/held-out split.
    let mut permutation: Vec<usize> = (0..n_samples).collect();
    permutation.shuffle(&mut master_rng);
    let n_train = (n_samples as f64 * (1.0 - config.test_fraction)) as usize;
    if n_train == 0 {
        return Err(RfError::EmptyTrainingSplit {
            n_samples,
            test_fraction: config.test_fraction,
        });
    }
    let train_split = dataset.subset(&permutation[..n_train]);
    let held_out = dataset.subset(&permutation[n_train..]);

    info!(
        n_trees = config.n_trees,
        n_train,
        n_held_out = held_out.n_samples(),
        n_features,
        "training random forest"
    );

    // Generate per-tree seeds from master RNG.
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let tree_config = DecisionTreeConfig::new();
    let mut trees = Vec::with_capacity(config.n_trees);
    let mut bootstrap_sizes = Vec::with_capacity(config.n_trees);
    for (tree_index, seed) in tree_seeds.into_iter().enumerate() {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let bootstrap = train_split.subset(&bootstrap_sample(n_train, &mut rng));
        debug!(
            tree_index,
            bootstrap_size = bootstrap.n_samples(),
            "training tree on bootstrap sample"
        );
        bootstrap_sizes.push(bootstrap.n_samples());
        trees.push(tree_config.train(&bootstrap)?);
    }

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_samples,
        n_train,
        n_held_out: held_out.n_samples(),
        n_features,
        bootstrap_sizes,
    };

    info!(n_trees_trained = trees.len(), "random forest training complete");

    Ok(RandomForestResult::new(
        RandomForest { trees, n_features },
        held_out,
        metadata,
    ))
}

impl RandomForest {
    /// Predict the class label for a single sample by majority vote.
    ///
    /// Each tree casts one vote. The label with the most votes wins; ties go
    /// to the lowest label.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        let votes = self.votes(sample)?;
        let mut winner = (0usize, 0usize);
        for (label, count) in votes {
            if count > winner.1 {
                winner = (label, count);
            }
        }
        Ok(winner.0)
    }

    /// Return the per-label vote tally for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn votes(&self, sample: &[f64]) -> Result<BTreeMap<usize, usize>, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut votes = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.predict(sample)?).or_insert(0) += 1;
        }
        Ok(votes)
    }

    /// Predict class labels for a batch of samples.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        features.iter().map(|sample| self.predict(sample)).collect()
    }

    /// Fraction of samples in `dataset` predicted correctly, in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | `dataset` has no samples |
    /// | [`RfError::PredictionFeatureMismatch`] | feature width differs from training |
    pub fn evaluate(&self, dataset: &Dataset) -> Result<f64, RfError> {
        let predictions = self.predict_labeled(dataset)?;
        let correct = predictions
            .iter()
            .zip(dataset.labels())
            .filter(|&(&p, &l)| p == l)
            .count();
        Ok(correct as f64 / dataset.n_samples() as f64)
    }

    /// Binary confusion counts (label `1` positive) with accuracy as a percentage.
    ///
    /// Unlike [`RandomForest::evaluate`], the returned accuracy is on the
    /// 0–100 scale.
    ///
    /// # Errors
    ///
    /// Same as [`RandomForest::evaluate`].
    pub fn evaluate_accuracy(&self, dataset: &Dataset) -> Result<AccuracyMetrics, RfError> {
        let predictions = self.predict_labeled(dataset)?;
        AccuracyMetrics::from_labels(dataset.labels(), &predictions)
    }

    fn predict_labeled(&self, dataset: &Dataset) -> Result<Vec<usize>, RfError> {
        if dataset.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if dataset.n_features() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: dataset.n_features(),
            });
        }
        self.predict_batch(dataset.features())
    }

    /// Return the trained trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

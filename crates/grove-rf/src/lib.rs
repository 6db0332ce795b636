//! Random forest classification: train, evaluate, predict, cross-validate.
//!
//! Provides a hand-rolled random forest classifier built from CART decision
//! trees with Gini-impurity splits. Trees are trained on bootstrap samples and
//! combined by majority vote; k-fold cross-validation estimates accuracy on
//! unseen data. Every random draw comes from a seeded `ChaCha8Rng`, so runs
//! with equal seeds produce identical forests.

mod config;
mod dataset;
mod error;
mod eval;
mod forest;
mod metrics;
mod node;
mod result;
mod split;
mod tree;

pub use config::RandomForestConfig;
pub use dataset::Dataset;
pub use error::{ErrorKind, RfError};
pub use eval::{CrossValidation, CrossValidationResult, cross_validate};
pub use forest::RandomForest;
pub use metrics::{AccuracyMetrics, POSITIVE_LABEL};
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use result::{RandomForestResult, TrainingMetadata};
pub use split::gini;
pub use tree::{DecisionPath, DecisionTree, DecisionTreeConfig, Direction, PathStep};

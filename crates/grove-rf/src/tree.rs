use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, instrument};

use crate::{
    RfError,
    dataset::Dataset,
    node::{FeatureIndex, Node, NodeIndex},
    split::{find_best_split, partition},
};

/// Configuration for a single CART decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter        | Default                 |
/// |------------------|-------------------------|
/// | `feature_subset` | `None` (all features)   |
///
/// Trees always grow until every leaf is pure. There is no depth limit or
/// minimum leaf size.
#[derive(Debug, Clone, Default)]
pub struct DecisionTreeConfig {
    pub(crate) feature_subset: Option<Vec<usize>>,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict split search to the given feature columns.
    ///
    /// `None` means consider all features. Duplicates are ignored and the
    /// columns are always searched in ascending order.
    #[must_use]
    pub fn with_feature_subset(mut self, feature_subset: Option<Vec<usize>>) -> Self {
        self.feature_subset = feature_subset;
        self
    }

    /// Return the feature subset, if set.
    #[must_use]
    pub fn feature_subset(&self) -> Option<&[usize]> {
        self.feature_subset.as_deref()
    }

    /// Train a decision tree on `dataset`.
    ///
    /// # Errors
    ///
    /// | Variant                             | When                                                  |
    /// |-------------------------------------|-------------------------------------------------------|
    /// | [`RfError::EmptyDataset`]           | `dataset` has no samples                              |
    /// | [`RfError::InvalidFeatureSubset`]   | the subset is empty or names a missing column         |
    /// | [`RfError::IncompleteModel`]        | a node received no samples (not reachable from a valid dataset) |
    #[instrument(skip_all, fields(n_samples = dataset.n_samples(), n_features = dataset.n_features()))]
    pub fn train(&self, dataset: &Dataset) -> Result<DecisionTree, RfError> {
        if dataset.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        let n_features = dataset.n_features();
        let feature_subset = self.resolve_feature_subset(n_features)?;

        debug!(
            n_samples = dataset.n_samples(),
            n_candidate_features = feature_subset.len(),
            "training decision tree"
        );

        let mut order: Vec<usize> = (0..dataset.n_samples()).collect();
        let mut arena: Vec<Node> = Vec::new();
        let builder = TreeBuilder {
            features: dataset.features(),
            labels: dataset.labels(),
            feature_subset: &feature_subset,
        };
        let root = builder.build(&mut order, 0, &mut arena)?;

        debug!(
            root_index = root.index(),
            n_nodes = arena.len(),
            "decision tree built"
        );

        Ok(DecisionTree {
            nodes: arena,
            n_features,
        })
    }

    fn resolve_feature_subset(&self, n_features: usize) -> Result<Vec<usize>, RfError> {
        let Some(subset) = &self.feature_subset else {
            return Ok((0..n_features).collect());
        };
        if subset.is_empty() || subset.iter().any(|&f| f >= n_features) {
            return Err(RfError::InvalidFeatureSubset {
                subset: subset.clone(),
                n_features,
            });
        }
        let mut resolved = subset.clone();
        resolved.sort_unstable();
        resolved.dedup();
        Ok(resolved)
    }
}

/// Borrowed training state shared by every recursive build step.
struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [usize],
    feature_subset: &'a [usize],
}

impl TreeBuilder<'_> {
    /// Build the subtree for the samples in `active` and return its arena index.
    ///
    /// `active` is a window of the shared sample permutation; it is reordered
    /// in place so each child receives a contiguous sub-range.
    fn build(
        &self,
        active: &mut [usize],
        depth: usize,
        arena: &mut Vec<Node>,
    ) -> Result<NodeIndex, RfError> {
        let Some(&first) = active.first() else {
            return Err(RfError::IncompleteModel { depth });
        };
        let n_samples = active.len();

        let first_label = self.labels[first];
        if active.iter().all(|&si| self.labels[si] == first_label) {
            return Ok(push_leaf(arena, first_label, n_samples));
        }

        let Some(split) = find_best_split(self.features, self.labels, active, self.feature_subset)
        else {
            // Mixed labels over identical feature values.
            let label = majority_label(self.labels, active);
            debug!(depth, n_samples, label, "no valid threshold, using majority leaf");
            return Ok(push_leaf(arena, label, n_samples));
        };

        // Arena pattern: reserve index, recurse, then overwrite with the split.
        let node_idx = arena.len();
        arena.push(Node::Leaf {
            label: first_label,
            n_samples,
        });

        let mid = partition(self.features, active, split.feature, split.threshold);
        let (left_active, right_active) = active.split_at_mut(mid);
        let left = self.build(left_active, depth + 1, arena)?;
        let right = self.build(right_active, depth + 1, arena)?;

        arena[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity: split.impurity,
            n_samples,
        };

        Ok(NodeIndex::new(node_idx))
    }
}

fn push_leaf(arena: &mut Vec<Node>, label: usize, n_samples: usize) -> NodeIndex {
    let idx = arena.len();
    arena.push(Node::Leaf { label, n_samples });
    NodeIndex::new(idx)
}

/// Most frequent label among `active`; ties go to the lowest label.
fn majority_label(labels: &[usize], active: &[usize]) -> usize {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &si in active {
        *counts.entry(labels[si]).or_insert(0) += 1;
    }
    let mut best = (0, 0);
    for (label, count) in counts {
        if count > best.1 {
            best = (label, count);
        }
    }
    best.0
}

/// A fitted CART decision tree.
///
/// Stored as an arena-based `Vec<Node>` rooted at index 0.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
}

/// Which child a traversal moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The sample value was below the threshold.
    Left,
    /// The sample value was at or above the threshold.
    Right,
}

/// One split node visited while predicting a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    /// Arena index of the split node.
    pub node: NodeIndex,
    /// Feature tested at this node.
    pub feature: FeatureIndex,
    /// Threshold of the split.
    pub threshold: f64,
    /// The sample's value for `feature`.
    pub value: f64,
    /// Child taken.
    pub direction: Direction,
}

/// Root-to-leaf route taken by a single prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionPath {
    /// Split nodes in visiting order.
    pub steps: Vec<PathStep>,
    /// Arena index of the leaf that was reached.
    pub leaf: NodeIndex,
    /// Label of that leaf.
    pub label: usize,
}

impl fmt::Display for DecisionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "root")?;
        for step in &self.steps {
            let (op, side) = match step.direction {
                Direction::Left => ("<", "left"),
                Direction::Right => (">=", "right"),
            };
            writeln!(
                f,
                "  node {}: x[{}] = {} {} {} -> {}",
                step.node, step.feature, step.value, op, step.threshold, side
            )?;
        }
        write!(f, "  leaf {}: label {}", self.leaf, self.label)
    }
}

impl DecisionTree {
    /// Predict the class label for a single sample.
    ///
    /// Traverses from the root: at each `Split`, goes left when
    /// `sample[feature] < threshold`, right otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(self.decision_path(sample)?.label)
    }

    /// Predict a sample and log every visited node at `info` level.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_verbose(&self, sample: &[f64]) -> Result<usize, RfError> {
        let path = self.decision_path(sample)?;
        info!("starting at root");
        for step in &path.steps {
            info!(
                node = step.node.index(),
                feature = step.feature.index(),
                threshold = step.threshold,
                value = step.value,
                direction = ?step.direction,
                "visiting split"
            );
        }
        info!(leaf = path.leaf.index(), label = path.label, "reached leaf");
        Ok(path.label)
    }

    /// Return the route a sample takes from the root to its leaf.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn decision_path(&self, sample: &[f64]) -> Result<DecisionPath, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut steps = Vec::new();
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { label, .. } => {
                    return Ok(DecisionPath {
                        steps,
                        leaf: NodeIndex::new(idx),
                        label: *label,
                    });
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = sample[feature.index()];
                    let (direction, next) = if value < *threshold {
                        (Direction::Left, *left)
                    } else {
                        (Direction::Right, *right)
                    };
                    steps.push(PathStep {
                        node: NodeIndex::new(idx),
                        feature: *feature,
                        threshold: *threshold,
                        value,
                        direction,
                    });
                    idx = next.index();
                }
            }
        }
    }

    /// Return the node arena; the root is at index 0.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the number of features this tree was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        // BFS: (node_index, current_depth)
        let mut max_depth = 0usize;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    queue.push_back((left.index(), d + 1));
                    queue.push_back((right.index(), d + 1));
                }
            }
        }

        max_depth
    }
}

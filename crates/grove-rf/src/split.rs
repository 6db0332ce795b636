use std::collections::BTreeMap;

use crate::node::{FeatureIndex, Impurity};

/// Per-class sample counts, keyed by label.
pub(crate) type ClassCounts = BTreeMap<usize, usize>;

/// Gini impurity of a set from its class counts: `1 - Σ(p_c²)`.
///
/// Returns `0.0` for an empty set.
#[must_use]
pub fn gini(class_counts: &ClassCounts, n_samples: usize) -> f64 {
    if n_samples == 0 {
        return 0.0;
    }
    let n = n_samples as f64;
    let sum_sq: f64 = class_counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

/// Size-weighted Gini of a two-way partition.
fn weighted_gini(left: &ClassCounts, n_left: usize, right: &ClassCounts, n_right: usize) -> Impurity {
    let total = (n_left + n_right) as f64;
    let value = (n_left as f64 * gini(left, n_left) + n_right as f64 * gini(right, n_right)) / total;
    Impurity::new(value)
}

/// Best split found for one node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    pub(crate) impurity: Impurity,
}

/// Find the Gini-minimizing `(feature, threshold)` over the samples in `active`.
///
/// Each candidate feature is scanned over the active samples ordered by
/// that feature's value, growing the left class counts one sample at a
/// time. Candidate thresholds are midpoints of consecutive distinct values.
/// Features are visited in the order given and thresholds in ascending
/// order; a candidate replaces the incumbent only when strictly better, so
/// ties resolve to the first one seen.
///
/// Returns `None` when every candidate feature is constant over `active`.
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    labels: &[usize],
    active: &[usize],
    feature_subset: &[usize],
) -> Option<SplitResult> {
    let n_samples = active.len();
    if n_samples < 2 {
        return None;
    }

    let mut parent_counts = ClassCounts::new();
    for &si in active {
        *parent_counts.entry(labels[si]).or_insert(0) += 1;
    }

    let mut best: Option<SplitResult> = None;

    for &feat_idx in feature_subset {
        let mut sorted: Vec<(f64, usize)> = active
            .iter()
            .map(|&si| (features[si][feat_idx], labels[si]))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_counts = ClassCounts::new();
        let mut right_counts = parent_counts.clone();

        for i in 0..(n_samples - 1) {
            let (val_i, class_i) = sorted[i];
            *left_counts.entry(class_i).or_insert(0) += 1;
            if let Some(c) = right_counts.get_mut(&class_i) {
                *c -= 1;
                if *c == 0 {
                    right_counts.remove(&class_i);
                }
            }

            let val_next = sorted[i + 1].0;
            if val_i == val_next {
                continue;
            }

            let n_left = i + 1;
            let impurity = weighted_gini(&left_counts, n_left, &right_counts, n_samples - n_left);
            if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                best = Some(SplitResult {
                    feature: FeatureIndex::new(feat_idx),
                    threshold: midpoint_threshold(val_i, val_next),
                    impurity,
                });
            }
        }
    }

    best
}

/// Threshold between two distinct sorted values, satisfying `lo < t <= hi`.
///
/// Adjacent doubles have no representable value between them, so the
/// midpoint can round down to `lo`; `hi` is used instead.
fn midpoint_threshold(lo: f64, hi: f64) -> f64 {
    let mut mid = (lo + hi) / 2.0;
    if !mid.is_finite() {
        mid = lo / 2.0 + hi / 2.0;
    }
    if mid <= lo || mid > hi { hi } else { mid }
}

/// Reorder `active` in place so samples with `feature < threshold` come first.
///
/// Returns the split point: the number of samples moved to the front. When
/// the partition is degenerate (all left or all right) the midpoint of the
/// range is returned instead, so both sides stay non-empty.
pub(crate) fn partition(
    features: &[Vec<f64>],
    active: &mut [usize],
    feature: FeatureIndex,
    threshold: f64,
) -> usize {
    let mut mid = 0;
    for i in 0..active.len() {
        if features[active[i]][feature.index()] < threshold {
            active.swap(mid, i);
            mid += 1;
        }
    }
    if mid == 0 || mid == active.len() {
        mid = active.len() / 2;
    }
    mid
}

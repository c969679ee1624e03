//! Exact SHAP values for tree ensembles.
//!
//! Implements the polynomial-time path-dependent algorithm: conditional
//! expectations over unknown features follow the training covers recorded on
//! each node, so no background dataset is needed. For every row,
//! `expected_value() + sum(shap_values(row)) == model.predict(row)`.

use crate::ml::gbdt::{GbdtRegressor, RegressionTree};

/// Explains predictions of a [`GbdtRegressor`].
#[derive(Debug, Clone, Copy)]
pub struct TreeExplainer<'a> {
    model: &'a GbdtRegressor,
}

impl<'a> TreeExplainer<'a> {
    pub fn new(model: &'a GbdtRegressor) -> Self {
        Self { model }
    }

    /// Model output when no feature value is known.
    pub fn expected_value(&self) -> f64 {
        self.model.base_score
            + self
                .model
                .trees
                .iter()
                .map(RegressionTree::expected_value)
                .sum::<f64>()
    }

    /// One attribution per model feature, in feature order.
    pub fn shap_values(&self, features: &[f64]) -> Vec<f64> {
        let mut phi = vec![0.0; self.model.feature_len()];
        for tree in &self.model.trees {
            tree_shap(tree, features, &mut phi);
        }
        phi
    }
}

/// Accumulate the SHAP values of one tree into `phi`.
pub fn tree_shap(tree: &RegressionTree, features: &[f64], phi: &mut [f64]) {
    if tree.nodes.is_empty() {
        return;
    }
    recurse(tree, features, phi, 0, &[], 1.0, 1.0, None);
}

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &RegressionTree,
    features: &[f64],
    phi: &mut [f64],
    node_idx: usize,
    parent_path: &[PathElement],
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    let mut path = parent_path.to_vec();
    extend_path(&mut path, zero_fraction, one_fraction, feature);
    let node = &tree.nodes[node_idx];

    let Some(split) = node.feature else {
        for i in 1..path.len() {
            let weight = unwound_path_sum(&path, i);
            let element = path[i];
            if let Some(slot) = element.feature.and_then(|f| phi.get_mut(f)) {
                *slot += weight * (element.one_fraction - element.zero_fraction) * node.value;
            }
        }
        return;
    };

    let value = features.get(split).copied().unwrap_or(0.0);
    let (hot, cold) = if value <= node.threshold {
        (node.left, node.right)
    } else {
        (node.right, node.left)
    };
    let hot_zero_fraction = tree.nodes[hot].cover / node.cover;
    let cold_zero_fraction = tree.nodes[cold].cover / node.cover;

    // A feature seen higher on the path is folded into this split.
    let mut incoming_zero = 1.0;
    let mut incoming_one = 1.0;
    if let Some(k) = path.iter().position(|e| e.feature == Some(split)) {
        incoming_zero = path[k].zero_fraction;
        incoming_one = path[k].one_fraction;
        unwind_path(&mut path, k);
    }

    recurse(
        tree,
        features,
        phi,
        hot,
        &path,
        hot_zero_fraction * incoming_zero,
        incoming_one,
        Some(split),
    );
    recurse(
        tree,
        features,
        phi,
        cold,
        &path,
        cold_zero_fraction * incoming_zero,
        0.0,
        Some(split),
    );
}

fn extend_path(
    path: &mut Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });
    let denom = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / denom;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / denom;
    }
}

fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next_one_portion * denom / ((i + 1) as f64 * one_fraction);
            next_one_portion = tmp - path[i].weight * zero_fraction * (depth - i) as f64 / denom;
        } else {
            path[i].weight = path[i].weight * denom / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

/// Total path weight with element `index` removed, without mutating the path.
fn unwound_path_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * denom / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion = path[i].weight - tmp * zero_fraction * (depth - i) as f64 / denom;
        } else {
            total += path[i].weight / zero_fraction / ((depth - i) as f64 / denom);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::gbdt::fixtures::sample_tree;
    use crate::ml::gbdt::{GbdtRegressor, MODEL_VERSION, TrainDataset, TrainOptions, train_gbdt};

    /// E[f(x) | x_S] following covers for features outside `known`.
    fn conditional_expectation(tree: &RegressionTree, idx: usize, row: &[f64], known: u32) -> f64 {
        let node = &tree.nodes[idx];
        let Some(feature) = node.feature else {
            return node.value;
        };
        if known & (1 << feature) != 0 {
            let next = node.route(row).unwrap();
            return conditional_expectation(tree, next, row, known);
        }
        let left = &tree.nodes[node.left];
        let right = &tree.nodes[node.right];
        (left.cover * conditional_expectation(tree, node.left, row, known)
            + right.cover * conditional_expectation(tree, node.right, row, known))
            / node.cover
    }

    fn factorial(n: usize) -> f64 {
        (1..=n).map(|v| v as f64).product()
    }

    fn brute_force_shap(tree: &RegressionTree, row: &[f64]) -> Vec<f64> {
        let m = row.len();
        let mut phi = vec![0.0; m];
        for (i, slot) in phi.iter_mut().enumerate() {
            for subset in 0u32..(1 << m) {
                if subset & (1 << i) != 0 {
                    continue;
                }
                let size = subset.count_ones() as usize;
                let weight = factorial(size) * factorial(m - size - 1) / factorial(m);
                let with = conditional_expectation(tree, 0, row, subset | (1 << i));
                let without = conditional_expectation(tree, 0, row, subset);
                *slot += weight * (with - without);
            }
        }
        phi
    }

    #[test]
    fn matches_brute_force_shapley_values() {
        let tree = sample_tree();
        let rows = [
            [0.0, 1.0, 1.0],
            [2.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.5, 0.5, 0.5],
        ];
        for row in rows {
            let mut phi = vec![0.0; 3];
            tree_shap(&tree, &row, &mut phi);
            let expected = brute_force_shap(&tree, &row);
            for (got, want) in phi.iter().zip(&expected) {
                assert!((got - want).abs() < 1e-9, "row {row:?}: {phi:?} vs {expected:?}");
            }
        }
    }

    #[test]
    fn single_leaf_tree_attributes_nothing() {
        let model = GbdtRegressor {
            model_version: MODEL_VERSION,
            feature_names: vec!["a".into()],
            base_score: 2.0,
            learning_rate: 0.3,
            trees: vec![RegressionTree {
                nodes: vec![crate::ml::gbdt::TreeNode::leaf(1.5, 4.0)],
            }],
        };
        let explainer = TreeExplainer::new(&model);
        assert_eq!(explainer.shap_values(&[7.0]), vec![0.0]);
        assert_eq!(explainer.expected_value(), 3.5);
    }

    #[test]
    fn trained_model_satisfies_local_accuracy() {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..60 {
            let a = (i % 5) as f64;
            let b = ((i / 5) % 3) as f64;
            let c = (i % 2) as f64;
            x.push(vec![a, b, c]);
            y.push(2.0 * a + b * c - 4.0 * c);
        }
        let dataset = TrainDataset {
            feature_names: vec!["a".into(), "b".into(), "c".into()],
            x,
            y,
        };
        let options = TrainOptions {
            rounds: 20,
            ..TrainOptions::default()
        };
        let model = train_gbdt(&dataset, &options).unwrap();
        let explainer = TreeExplainer::new(&model);
        let base = explainer.expected_value();
        for row in &dataset.x {
            let phi = explainer.shap_values(row);
            let total: f64 = phi.iter().sum();
            assert!((base + total - model.predict(row)).abs() < 1e-6);
        }
    }
}

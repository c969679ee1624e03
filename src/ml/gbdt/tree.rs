use serde::{Deserialize, Serialize};

use super::GbdtError;

/// Node of a binary regression tree stored in a flat arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Split feature index; `None` marks a leaf.
    pub feature: Option<usize>,
    /// Rows with `feature <= threshold` go left.
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
    /// Output for leaves; the pre-split weight for internal nodes.
    pub value: f64,
    /// Training rows that reached this node.
    pub cover: f64,
}

impl TreeNode {
    pub fn leaf(value: f64, cover: f64) -> Self {
        Self {
            feature: None,
            threshold: 0.0,
            left: 0,
            right: 0,
            value,
            cover,
        }
    }

    pub fn split(feature: usize, threshold: f64, left: usize, right: usize, cover: f64) -> Self {
        Self {
            feature: Some(feature),
            threshold,
            left,
            right,
            value: 0.0,
            cover,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature.is_none()
    }

    /// Child index a feature row is routed to. Leaves return `None`.
    pub fn route(&self, features: &[f64]) -> Option<usize> {
        let feature = self.feature?;
        let value = features.get(feature).copied().unwrap_or(0.0);
        Some(if value <= self.threshold {
            self.left
        } else {
            self.right
        })
    }
}

/// Regression tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Index of the leaf reached by a feature row.
    pub fn leaf_index(&self, features: &[f64]) -> usize {
        let mut idx = 0usize;
        while let Some(next) = self.nodes[idx].route(features) {
            idx = next;
        }
        idx
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.nodes[self.leaf_index(features)].value
    }

    /// Cover-weighted mean output, i.e. the prediction when no feature is known.
    pub fn expected_value(&self) -> f64 {
        self.expected_value_from(0)
    }

    fn expected_value_from(&self, idx: usize) -> f64 {
        let node = &self.nodes[idx];
        if node.is_leaf() {
            return node.value;
        }
        let left = &self.nodes[node.left];
        let right = &self.nodes[node.right];
        (left.cover * self.expected_value_from(node.left)
            + right.cover * self.expected_value_from(node.right))
            / node.cover
    }

    /// Longest root-to-leaf edge count.
    pub fn depth(&self) -> usize {
        fn walk(tree: &RegressionTree, idx: usize) -> usize {
            let node = &tree.nodes[idx];
            if node.is_leaf() {
                0
            } else {
                1 + walk(tree, node.left).max(walk(tree, node.right))
            }
        }
        walk(self, 0)
    }

    /// Check arena shape, feature bounds and covers.
    ///
    /// Children must come after their parent, which rules out cycles.
    pub fn validate(&self, feature_len: usize) -> Result<(), GbdtError> {
        if self.nodes.is_empty() {
            return Err(GbdtError::InvalidModel("tree has no nodes".to_string()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if !(node.cover.is_finite() && node.cover > 0.0) {
                return Err(GbdtError::InvalidModel(format!(
                    "node {idx} has non-positive cover {}",
                    node.cover
                )));
            }
            if !node.value.is_finite() || !node.threshold.is_finite() {
                return Err(GbdtError::InvalidModel(format!(
                    "node {idx} has a non-finite value"
                )));
            }
            let Some(feature) = node.feature else {
                continue;
            };
            if feature >= feature_len {
                return Err(GbdtError::InvalidModel(format!(
                    "node {idx} splits on feature {feature} but rows have {feature_len}"
                )));
            }
            for child in [node.left, node.right] {
                if child <= idx || child >= self.nodes.len() {
                    return Err(GbdtError::InvalidModel(format!(
                        "node {idx} has invalid child {child}"
                    )));
                }
            }
        }
        Ok(())
    }
}

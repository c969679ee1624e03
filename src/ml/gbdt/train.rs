use super::GbdtError;
use super::model::{GbdtRegressor, MODEL_VERSION};
use super::tree::{RegressionTree, TreeNode};

/// Splits must improve the regularized objective by more than this.
const MIN_SPLIT_GAIN: f64 = 1e-9;

/// Training hyperparameters for squared-error boosting.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Number of boosting rounds (trees).
    pub rounds: usize,
    /// Shrinkage applied to every leaf.
    pub learning_rate: f64,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// L2 regularization on leaf weights.
    pub lambda: f64,
    /// Minimum hessian sum (row count for squared error) per child.
    pub min_child_weight: f64,
    /// Number of bins used for split search.
    pub bins: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            rounds: 100,
            learning_rate: 0.3,
            max_depth: 6,
            lambda: 1.0,
            min_child_weight: 1.0,
            bins: 64,
        }
    }
}

/// In-memory regression dataset.
#[derive(Debug, Clone)]
pub struct TrainDataset {
    /// Ordered feature columns.
    pub feature_names: Vec<String>,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f64>>,
    /// Targets aligned with `x`.
    pub y: Vec<f64>,
}

impl TrainDataset {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Train a gradient-boosted regression tree ensemble on squared error.
pub fn train_gbdt(
    dataset: &TrainDataset,
    options: &TrainOptions,
) -> Result<GbdtRegressor, GbdtError> {
    if dataset.x.len() != dataset.y.len() {
        return Err(GbdtError::InvalidDataset("Mismatched X/Y lengths".to_string()));
    }
    if dataset.is_empty() {
        return Err(GbdtError::InvalidDataset("Empty dataset".to_string()));
    }
    let d = dataset.feature_names.len();
    if d == 0 {
        return Err(GbdtError::InvalidDataset("No feature columns".to_string()));
    }
    if let Some(idx) = dataset.x.iter().position(|row| row.len() != d) {
        return Err(GbdtError::InvalidDataset(format!(
            "Row {idx} has {} values but {d} features are declared",
            dataset.x[idx].len()
        )));
    }
    if dataset.y.iter().any(|v| !v.is_finite()) {
        return Err(GbdtError::InvalidDataset("Non-finite target".to_string()));
    }

    let n = dataset.len();
    let bins = options.bins.clamp(2, 256);
    let (mins, maxs) = compute_feature_min_max(&dataset.x, d);
    let binned = bin_features(&dataset.x, &mins, &maxs, bins);

    let base_score = dataset.y.iter().sum::<f64>() / n as f64;
    let mut predictions = vec![base_score; n];
    let mut trees = Vec::with_capacity(options.rounds);

    for _round in 0..options.rounds {
        // Squared error: g = prediction - target, h = 1.
        let gradients: Vec<f64> = predictions
            .iter()
            .zip(&dataset.y)
            .map(|(p, y)| p - y)
            .collect();
        let mut builder = TreeBuilder {
            x: &dataset.x,
            binned: &binned,
            mins: &mins,
            maxs: &maxs,
            bins,
            gradients: &gradients,
            options,
            nodes: Vec::new(),
        };
        builder.grow((0..n).collect(), 0);
        let tree = RegressionTree {
            nodes: builder.nodes,
        };
        for (pred, row) in predictions.iter_mut().zip(&dataset.x) {
            *pred += tree.predict(row);
        }
        trees.push(tree);
    }

    Ok(GbdtRegressor {
        model_version: MODEL_VERSION,
        feature_names: dataset.feature_names.clone(),
        base_score,
        learning_rate: options.learning_rate,
        trees,
    })
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    binned: &'a [Vec<u8>],
    mins: &'a [f64],
    maxs: &'a [f64],
    bins: usize,
    gradients: &'a [f64],
    options: &'a TrainOptions,
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    gain: f64,
    feature_index: usize,
    split_bin: usize,
}

impl TreeBuilder<'_> {
    /// Grow the subtree for `rows` and return its node index.
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let idx = self.nodes.len();
        let grad_sum: f64 = rows.iter().map(|&i| self.gradients[i]).sum();
        let cover = rows.len() as f64;
        let weight = -grad_sum / (cover + self.options.lambda) * self.options.learning_rate;
        self.nodes.push(TreeNode::leaf(weight, cover));

        if depth >= self.options.max_depth || rows.len() < 2 {
            return idx;
        }
        let Some(split) = self.best_split(&rows, grad_sum) else {
            return idx;
        };

        let threshold = threshold_for_bin(
            self.mins[split.feature_index],
            self.maxs[split.feature_index],
            split.split_bin,
            self.bins,
        );
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&i| self.x[i][split.feature_index] <= threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return idx;
        }

        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        let mut node = TreeNode::split(split.feature_index, threshold, left, right, cover);
        node.value = weight;
        self.nodes[idx] = node;
        idx
    }

    fn best_split(&self, rows: &[usize], grad_sum: f64) -> Option<BestSplit> {
        let mut best: Option<BestSplit> = None;
        for feature_idx in 0..self.mins.len() {
            if let Some(split) = self.best_split_for_feature(rows, grad_sum, feature_idx)
                && best.is_none_or(|b| split.gain > b.gain)
            {
                best = Some(split);
            }
        }
        best
    }

    fn best_split_for_feature(
        &self,
        rows: &[usize],
        grad_sum: f64,
        feature_idx: usize,
    ) -> Option<BestSplit> {
        let mut counts = vec![0f64; self.bins];
        let mut sums = vec![0f64; self.bins];
        for &i in rows {
            let b = self.binned[i][feature_idx] as usize;
            counts[b] += 1.0;
            sums[b] += self.gradients[i];
        }
        let total_count = rows.len() as f64;
        let lambda = self.options.lambda;
        let min_child = self.options.min_child_weight;
        let parent_score = grad_sum * grad_sum / (total_count + lambda);

        let mut best: Option<BestSplit> = None;
        let mut left_count = 0f64;
        let mut left_sum = 0f64;
        for split_bin in 0..(self.bins - 1) {
            left_count += counts[split_bin];
            left_sum += sums[split_bin];
            let right_count = total_count - left_count;
            if left_count < min_child || right_count < min_child {
                continue;
            }
            let right_sum = grad_sum - left_sum;
            let gain = left_sum * left_sum / (left_count + lambda)
                + right_sum * right_sum / (right_count + lambda)
                - parent_score;
            if gain > MIN_SPLIT_GAIN && best.is_none_or(|b| gain > b.gain) {
                best = Some(BestSplit {
                    gain,
                    feature_index: feature_idx,
                    split_bin,
                });
            }
        }
        best
    }
}

fn compute_feature_min_max(x: &[Vec<f64>], feature_len: usize) -> (Vec<f64>, Vec<f64>) {
    let mut mins = vec![f64::INFINITY; feature_len];
    let mut maxs = vec![f64::NEG_INFINITY; feature_len];
    for row in x {
        for (j, &v) in row.iter().take(feature_len).enumerate() {
            if v.is_finite() {
                mins[j] = mins[j].min(v);
                maxs[j] = maxs[j].max(v);
            }
        }
    }
    for j in 0..feature_len {
        if !mins[j].is_finite() || !maxs[j].is_finite() {
            mins[j] = 0.0;
            maxs[j] = 0.0;
        }
        if mins[j] == maxs[j] {
            maxs[j] = mins[j] + 1.0;
        }
    }
    (mins, maxs)
}

fn bin_index(v: f64, min: f64, max: f64, bins: usize) -> u8 {
    let t = if max > min && v.is_finite() {
        ((v - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (t * (bins - 1) as f64).round() as u8
}

fn bin_features(x: &[Vec<f64>], mins: &[f64], maxs: &[f64], bins: usize) -> Vec<Vec<u8>> {
    x.iter()
        .map(|row| {
            mins.iter()
                .zip(maxs)
                .enumerate()
                .map(|(j, (&min, &max))| {
                    bin_index(row.get(j).copied().unwrap_or(0.0), min, max, bins)
                })
                .collect()
        })
        .collect()
}

/// Raw-value threshold separating bins `<= split_bin` from the rest.
fn threshold_for_bin(min: f64, max: f64, split_bin: usize, bins: usize) -> f64 {
    let t = (split_bin as f64 + 0.5) / (bins - 1) as f64;
    min + t * (max - min)
}

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::GbdtError;
use super::tree::RegressionTree;

/// Current on-disk model format.
pub const MODEL_VERSION: i64 = 1;

/// Gradient-boosted regression tree ensemble.
///
/// The learning rate is already folded into every leaf value, so a prediction
/// is `base_score` plus the sum of the tree outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtRegressor {
    /// Model format version.
    pub model_version: i64,
    /// Ordered feature columns the trees index into.
    pub feature_names: Vec<String>,
    /// Starting prediction before any tree is applied.
    pub base_score: f64,
    /// Shrinkage used during training (informational).
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

impl GbdtRegressor {
    pub fn feature_len(&self) -> usize {
        self.feature_names.len()
    }

    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), GbdtError> {
        if self.model_version != MODEL_VERSION {
            return Err(GbdtError::InvalidModel(format!(
                "unsupported model_version {} (expected {MODEL_VERSION})",
                self.model_version
            )));
        }
        if self.feature_names.is_empty() {
            return Err(GbdtError::InvalidModel("model has no features".to_string()));
        }
        if !self.base_score.is_finite() {
            return Err(GbdtError::InvalidModel("base_score is not finite".to_string()));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_len())
                .map_err(|err| GbdtError::InvalidModel(format!("tree {idx}: {err}")))?;
        }
        Ok(())
    }

    /// Load and validate a model from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, GbdtError> {
        let bytes = std::fs::read(path).map_err(|source| GbdtError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_slice(&bytes).map_err(|source| GbdtError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        model.validate()?;
        Ok(model)
    }

    /// Write the model as pretty JSON, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<(), GbdtError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| GbdtError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let bytes = serde_json::to_vec_pretty(self).map_err(GbdtError::Serialize)?;
        std::fs::write(path, bytes).map_err(|source| GbdtError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Predict the target for a feature row.
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.base_score
            + self
                .trees
                .iter()
                .map(|tree| tree.predict(features))
                .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::gbdt::tree::{TreeNode, fixtures::sample_tree};
    use tempfile::tempdir;

    fn model() -> GbdtRegressor {
        GbdtRegressor {
            model_version: MODEL_VERSION,
            feature_names: vec!["a".into(), "b".into(), "c".into()],
            base_score: 10.0,
            learning_rate: 0.3,
            trees: vec![
                sample_tree(),
                RegressionTree {
                    nodes: vec![TreeNode::leaf(0.25, 10.0)],
                },
            ],
        }
    }

    #[test]
    fn prediction_sums_base_and_trees() {
        let model = model();
        assert_eq!(model.predict(&[2.0, 0.0, 0.0]), 10.0 + 3.0 + 0.25);
    }

    #[test]
    fn json_round_trip_preserves_predictions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("models").join("time_model.json");
        let model = model();
        model.save_json(&path).unwrap();
        let loaded = GbdtRegressor::load_json(&path).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn load_rejects_out_of_range_split() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut model = model();
        model.feature_names.truncate(2);
        std::fs::write(&path, serde_json::to_vec(&model).unwrap()).unwrap();
        assert!(matches!(
            GbdtRegressor::load_json(&path),
            Err(GbdtError::InvalidModel(_))
        ));
    }
}

//! Deterministic gradient-boosted regression trees.
//!
//! A small, dependency-free booster that covers what the overrun models need:
//! - Squared-error boosting with second-order gain and L2 leaf regularization.
//! - Histogram split search over equal-width bins.
//! - Per-node covers, which tree SHAP needs for its conditional expectations.
//! - Reproducible JSON model export/load.

mod model;
mod train;
mod tree;

pub use model::{GbdtRegressor, MODEL_VERSION};
pub use train::{TrainDataset, TrainOptions, train_gbdt};
pub use tree::{RegressionTree, TreeNode};

#[cfg(test)]
pub(crate) use tree::fixtures;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GbdtError {
    #[error("invalid training data: {0}")]
    InvalidDataset(String),
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("Failed to read model {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse model {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to write model {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize model: {0}")]
    Serialize(serde_json::Error),
}

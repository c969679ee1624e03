//! Machine learning building blocks for training and inference.
//!
//! Boosted regression trees, exact tree SHAP attribution and regression
//! metrics, all loadable from and exportable to JSON.

pub mod gbdt;
pub mod metrics;
pub mod shap;

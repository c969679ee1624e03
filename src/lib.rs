//! Library exports for the overrun service, trainer and benchmarks.
/// Application directory resolution.
pub mod app_dirs;
/// Model artifact persistence.
pub mod artifacts;
/// Service configuration.
pub mod config;
/// Synthetic project datasets.
pub mod dataset;
/// One-hot encoding and feature alignment.
pub mod encoding;
/// Logging setup.
pub mod logging;
/// Boosted trees, SHAP and metrics.
pub mod ml;
/// Prediction pipeline.
pub mod predict;
/// Project attributes and derived features.
pub mod project;
/// HTTP service.
pub mod server;
/// Dataset-to-artifacts training.
pub mod training;

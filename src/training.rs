//! End-to-end training: encode a dataset, fit both regressors, score a
//! held-out split and bundle the artifacts.

use rand::seq::SliceRandom;
use rand::{SeedableRng, rngs::StdRng};
use thiserror::Error;

use crate::artifacts::ModelArtifacts;
use crate::dataset::ProjectRecord;
use crate::encoding::{EncodingError, encode_matrix, fit_project_encoder};
use crate::ml::gbdt::{GbdtError, TrainDataset, TrainOptions, train_gbdt};
use crate::ml::metrics::{RegressionMetrics, evaluate};
use crate::project::features::NUMERIC_COLUMNS;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("test fraction {0} leaves no training rows")]
    NoTrainingRows(f64),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("{target} model: {source}")]
    Model {
        target: &'static str,
        source: GbdtError,
    },
}

/// Options for [`train_artifacts`].
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    /// Booster hyperparameters shared by both models.
    pub gbdt: TrainOptions,
    /// Share of rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            gbdt: TrainOptions::default(),
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub artifacts: ModelArtifacts,
    pub train_rows: usize,
    pub test_rows: usize,
    pub time_metrics: RegressionMetrics,
    pub cost_metrics: RegressionMetrics,
}

/// Fit the encoder and both overrun models on `records`.
pub fn train_artifacts(
    records: &[ProjectRecord],
    options: &TrainingOptions,
) -> Result<TrainingReport, TrainError> {
    if records.is_empty() {
        return Err(TrainError::EmptyDataset);
    }
    let encoder = fit_project_encoder(records)?;
    let mut model_features: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
    model_features.extend(encoder.feature_names_out());

    let x = encode_matrix(&encoder, &model_features, records)?;
    let time_y: Vec<f64> = records
        .iter()
        .map(|r| r.actual_time_overrun_days as f64)
        .collect();
    let cost_y: Vec<f64> = records.iter().map(|r| r.actual_cost_overrun_pct).collect();

    let (train_idx, test_idx) = split_indices(records.len(), options.test_fraction, options.seed);
    if train_idx.is_empty() {
        return Err(TrainError::NoTrainingRows(options.test_fraction));
    }
    let select =
        |idx: &[usize], values: &[f64]| idx.iter().map(|&i| values[i]).collect::<Vec<_>>();
    let train_x: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
    let test_x: Vec<Vec<f64>> = test_idx.iter().map(|&i| x[i].clone()).collect();

    let fit = |target: &'static str, y: &[f64]| {
        let dataset = TrainDataset {
            feature_names: model_features.clone(),
            x: train_x.clone(),
            y: select(&train_idx, y),
        };
        tracing::info!(model = target, rows = dataset.len(), "Training overrun model");
        train_gbdt(&dataset, &options.gbdt).map_err(|source| TrainError::Model { target, source })
    };
    let time_model = fit("time", &time_y)?;
    let cost_model = fit("cost", &cost_y)?;

    let time_metrics = evaluate(&time_model, &test_x, &select(&test_idx, &time_y));
    let cost_metrics = evaluate(&cost_model, &test_x, &select(&test_idx, &cost_y));

    Ok(TrainingReport {
        artifacts: ModelArtifacts {
            time_model,
            cost_model,
            encoder,
            model_features,
        },
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
        time_metrics,
        cost_metrics,
    })
}

/// Shuffle row indices with `seed` and hold out `ceil(n * test_fraction)`.
pub fn split_indices(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let test_len = ((n as f64) * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
    let train = indices.split_off(test_len.min(n));
    (train, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{GenerateOptions, generate_projects};

    #[test]
    fn split_is_seeded_and_disjoint() {
        let (train, test) = split_indices(100, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);
        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
        assert_eq!(split_indices(100, 0.2, 42), (train, test));
    }

    #[test]
    fn trained_models_beat_mean_baseline() {
        let records = generate_projects(&GenerateOptions {
            rows: 600,
            seed: Some(21),
        });
        let options = TrainingOptions {
            gbdt: TrainOptions {
                rounds: 30,
                learning_rate: 0.1,
                max_depth: 3,
                ..TrainOptions::default()
            },
            ..TrainingOptions::default()
        };
        let report = train_artifacts(&records, &options).unwrap();
        assert_eq!(report.test_rows, 120);
        assert_eq!(report.artifacts.model_features.len(), 9);
        assert_eq!(report.artifacts.model_features[0], "geospatial_risk_score");
        // Terrain and vendor explain most of the target variance.
        assert!(report.time_metrics.r2 > 0.3, "{:?}", report.time_metrics);
        assert!(report.cost_metrics.r2 > 0.3, "{:?}", report.cost_metrics);
    }

    #[test]
    fn everything_held_out_is_an_error() {
        let records = generate_projects(&GenerateOptions {
            rows: 5,
            seed: Some(1),
        });
        let options = TrainingOptions {
            test_fraction: 1.0,
            ..TrainingOptions::default()
        };
        assert!(matches!(
            train_artifacts(&records, &options),
            Err(TrainError::NoTrainingRows(_))
        ));
    }
}

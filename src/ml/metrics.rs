//! Evaluation metrics for regression models.

use serde::{Deserialize, Serialize};

use crate::ml::gbdt::GbdtRegressor;

/// Error summary of a regressor over a held-out set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Number of scored rows.
    pub count: usize,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Coefficient of determination; 0.0 when the targets are constant.
    pub r2: f64,
}

/// Compute metrics for paired predictions and targets.
///
/// Extra values in the longer slice are ignored.
pub fn regression_metrics(predictions: &[f64], targets: &[f64]) -> RegressionMetrics {
    let count = predictions.len().min(targets.len());
    if count == 0 {
        return RegressionMetrics {
            count: 0,
            rmse: 0.0,
            mae: 0.0,
            r2: 0.0,
        };
    }
    let n = count as f64;
    let mean = targets[..count].iter().sum::<f64>() / n;
    let mut sse = 0.0;
    let mut sae = 0.0;
    let mut sst = 0.0;
    for (&p, &t) in predictions.iter().zip(targets) {
        let err = p - t;
        sse += err * err;
        sae += err.abs();
        sst += (t - mean) * (t - mean);
    }
    RegressionMetrics {
        count,
        rmse: (sse / n).sqrt(),
        mae: sae / n,
        r2: if sst == 0.0 { 0.0 } else { 1.0 - sse / sst },
    }
}

/// Score a model on a feature matrix.
pub fn evaluate(model: &GbdtRegressor, x: &[Vec<f64>], y: &[f64]) -> RegressionMetrics {
    let predictions: Vec<f64> = x.iter().map(|row| model.predict(row)).collect();
    regression_metrics(&predictions, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let m = regression_metrics(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_eq!(m.count, 3);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn known_errors() {
        let m = regression_metrics(&[2.0, 2.0, 2.0, 2.0], &[1.0, 3.0, 1.0, 3.0]);
        assert_eq!(m.rmse, 1.0);
        assert_eq!(m.mae, 1.0);
        assert_eq!(m.r2, 0.0);
    }

    #[test]
    fn empty_input_is_zeroed() {
        assert_eq!(regression_metrics(&[], &[1.0]).count, 0);
    }
}

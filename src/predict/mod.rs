//! Per-request overrun prediction.
//!
//! A [`Predictor`] turns a [`ProjectInput`] into a [`PredictionOutput`]:
//! derived scores are encoded and aligned to the saved feature order, both
//! regressors are evaluated, and the time model's SHAP values are reduced to
//! the top hotspots and their risk buckets.

pub mod history;
pub mod hotspots;
mod pipeline;
pub mod risk;

use serde::{Deserialize, Serialize};

pub use history::{HistoricalData, generate_historical_data};
pub use hotspots::{Hotspot, top_hotspots};
pub use pipeline::Predictor;
pub use risk::{RiskCategory, categorize_hotspots};

#[cfg(test)]
pub(crate) use pipeline::fixtures;

/// Reported with every prediction; not derived from the models.
pub const CONFIDENCE_SCORE: f64 = 88.7;

/// Request body for `POST /predict`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub project_name: String,
    pub project_type: String,
    pub terrain: String,
    pub vendor_performance: String,
    /// Accepted but not a model feature.
    pub material_availability: String,
}

/// Response body for `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutput {
    /// Percent, two decimals.
    pub predicted_cost_overrun: f64,
    /// Days, never negative.
    pub predicted_time_overrun: i64,
    pub confidence_score: f64,
    pub hotspots: Vec<Hotspot>,
    pub historical_data: HistoricalData,
    pub risk_categories: Vec<RiskCategory>,
}

/// Decimal rounding with exact ties going to the even neighbor.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

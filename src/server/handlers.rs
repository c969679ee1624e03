//! HTTP request handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::predict::{PredictionOutput, ProjectInput};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Number of columns the loaded models expect.
    pub model_features: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        model_features: state.predictor.artifacts().model_features.len(),
    };
    (StatusCode::OK, Json(health))
}

/// `POST /predict`: score one project and explain the time estimate.
pub async fn predict(
    State(state): State<AppState>,
    Json(input): Json<ProjectInput>,
) -> Result<Json<PredictionOutput>, (StatusCode, Json<ErrorResponse>)> {
    match state.predictor.predict(&input) {
        Ok(output) => {
            tracing::info!(
                project = %input.project_name,
                project_type = %input.project_type,
                time_days = output.predicted_time_overrun,
                cost_pct = output.predicted_cost_overrun,
                "Prediction served"
            );
            Ok(Json(output))
        }
        Err(err) => {
            tracing::error!(project = %input.project_name, "Prediction failed: {err}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    detail: err.to_string(),
                }),
            ))
        }
    }
}

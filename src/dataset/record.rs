use serde::{Deserialize, Serialize};

/// One synthetic project with its targets and derived feature columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_name: String,
    pub project_type: String,
    pub terrain: String,
    pub vendor_performance: String,
    pub material_availability: String,
    pub delay_reason_text: String,
    /// Target: schedule overrun in days.
    pub actual_time_overrun_days: i64,
    /// Target: budget overrun in percent.
    pub actual_cost_overrun_pct: f64,
    pub geospatial_risk_score: i32,
    pub nlp_delay_topic: String,
    pub vendor_sentiment_score: f64,
}

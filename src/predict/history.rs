use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::project::ProjectType;

/// Number of past overruns reported alongside a prediction.
pub const HISTORY_LEN: usize = 30;

/// Illustrative overrun history for similar projects, in days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalData {
    pub overruns: Vec<i64>,
}

/// Inclusive day range sampled for a raw project type label.
pub fn history_range(project_type: &str) -> RangeInclusive<i64> {
    match ProjectType::parse(project_type) {
        Some(ProjectType::UndergroundCable) => 45..=150,
        Some(ProjectType::OverheadLine) => 20..=90,
        _ => 10..=60,
    }
}

/// Sample [`HISTORY_LEN`] synthetic overruns for `project_type`.
pub fn generate_historical_data<R: Rng + ?Sized>(project_type: &str, rng: &mut R) -> HistoricalData {
    let range = history_range(project_type);
    let overruns = (0..HISTORY_LEN)
        .map(|_| rng.random_range(range.clone()))
        .collect();
    HistoricalData { overruns }
}

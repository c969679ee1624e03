//! Deterministic feature engineering shared by training and inference.
//!
//! Both stages must call these exact functions; any drift between them
//! silently degrades predictions.

use super::attributes::{DelayTopic, Terrain, VendorPerformance};

/// Name of the terrain-derived numeric column.
pub const GEOSPATIAL_RISK_SCORE: &str = "geospatial_risk_score";
/// Name of the vendor-derived numeric column.
pub const VENDOR_SENTIMENT_SCORE: &str = "vendor_sentiment_score";
/// Name of the project type categorical column.
pub const PROJECT_TYPE: &str = "project_type";
/// Name of the delay topic categorical column.
pub const NLP_DELAY_TOPIC: &str = "nlp_delay_topic";

/// Numeric columns in the order they lead every feature vector.
pub const NUMERIC_COLUMNS: [&str; 2] = [GEOSPATIAL_RISK_SCORE, VENDOR_SENTIMENT_SCORE];
/// Categorical columns that go through the one-hot encoder.
pub const CATEGORICAL_COLUMNS: [&str; 2] = [PROJECT_TYPE, NLP_DELAY_TOPIC];

/// Topic used for every inference request.
pub const INFERENCE_DELAY_TOPIC: DelayTopic = DelayTopic::Execution;

impl Terrain {
    /// Fixed geospatial risk for the terrain.
    pub fn risk_score(self) -> i32 {
        match self {
            Terrain::Hilly => 90,
            Terrain::Forest => 70,
            Terrain::Coastal => 50,
            Terrain::Plains => 20,
        }
    }
}

impl VendorPerformance {
    /// Fixed sentiment score for the vendor track record.
    pub fn sentiment_score(self) -> f64 {
        match self {
            VendorPerformance::Excellent => 1.0,
            VendorPerformance::Good => 0.5,
            VendorPerformance::Average => -0.5,
            VendorPerformance::Poor => -1.0,
        }
    }
}

/// Geospatial risk for a raw terrain label; unknown labels score 0.
pub fn geospatial_risk_score(terrain: &str) -> i32 {
    Terrain::parse(terrain).map_or(0, Terrain::risk_score)
}

/// Vendor sentiment for a raw performance label; unknown labels score 0.0.
pub fn vendor_sentiment_score(performance: &str) -> f64 {
    VendorPerformance::parse(performance).map_or(0.0, VendorPerformance::sentiment_score)
}

const LAND_KEYWORDS: &[&str] = &["land", "permit", "regulatory", "communities"];
const SUPPLY_KEYWORDS: &[&str] = &["supply", "material", "components"];
const ENVIRONMENT_KEYWORDS: &[&str] = &["weather", "geological"];

/// Classify a free-text delay reason by keyword; first matching rule wins.
pub fn delay_topic_from_text(text: &str) -> DelayTopic {
    let lower = text.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|kw| lower.contains(kw));
    if mentions(LAND_KEYWORDS) {
        DelayTopic::LandAcquisition
    } else if mentions(SUPPLY_KEYWORDS) {
        DelayTopic::SupplyChain
    } else if mentions(ENVIRONMENT_KEYWORDS) {
        DelayTopic::Environmental
    } else {
        DelayTopic::Execution
    }
}

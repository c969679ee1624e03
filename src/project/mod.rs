//! Project attributes and the feature engineering derived from them.

pub mod attributes;
pub mod features;

pub use attributes::{DelayTopic, MaterialAvailability, ProjectType, Terrain, VendorPerformance};
pub use features::{delay_topic_from_text, geospatial_risk_score, vendor_sentiment_score};

//! Feature encoding shared by the trainer and the prediction service.
//!
//! Rows are always built by [`encode_project_row`] so column order and
//! indicator semantics cannot drift between the two stages. Inference rows are
//! then aligned with the saved `model_features` list via
//! [`FeatureFrame::reindex`].

mod frame;
mod one_hot;

pub use frame::FeatureFrame;
pub use one_hot::{EncodedColumn, OneHotEncoder};

use thiserror::Error;

use crate::dataset::ProjectRecord;
use crate::project::features::{CATEGORICAL_COLUMNS, GEOSPATIAL_RISK_SCORE, VENDOR_SENTIMENT_SCORE};

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("expected {expected} categorical values, found {found}")]
    Arity { expected: usize, found: usize },
    #[error("column {0} has no categories")]
    NoCategories(String),
    #[error("column {0} has unsorted or duplicate categories")]
    UnsortedCategories(String),
}

/// Fit the encoder on the categorical columns of a training set.
pub fn fit_project_encoder(records: &[ProjectRecord]) -> Result<OneHotEncoder, EncodingError> {
    let rows: Vec<[&str; 2]> = records
        .iter()
        .map(|r| [r.project_type.as_str(), r.nlp_delay_topic.as_str()])
        .collect();
    OneHotEncoder::fit(&CATEGORICAL_COLUMNS, &rows)
}

/// Build the full named feature row: numeric scores first, then indicators.
pub fn encode_project_row(
    encoder: &OneHotEncoder,
    geospatial_risk: i32,
    vendor_sentiment: f64,
    project_type: &str,
    delay_topic: &str,
) -> Result<FeatureFrame, EncodingError> {
    let mut frame = FeatureFrame::new();
    frame.push(GEOSPATIAL_RISK_SCORE, f64::from(geospatial_risk));
    frame.push(VENDOR_SENTIMENT_SCORE, vendor_sentiment);
    let indicators = encoder.transform(&[project_type, delay_topic])?;
    for (name, value) in encoder.feature_names_out().into_iter().zip(indicators) {
        frame.push(name, value);
    }
    Ok(frame)
}

/// Encode a dataset record with its training-time topic.
pub fn encode_record(
    encoder: &OneHotEncoder,
    record: &ProjectRecord,
) -> Result<FeatureFrame, EncodingError> {
    encode_project_row(
        encoder,
        record.geospatial_risk_score,
        record.vendor_sentiment_score,
        &record.project_type,
        &record.nlp_delay_topic,
    )
}

/// Encode every record and align each row to `model_features`.
pub fn encode_matrix<S: AsRef<str>>(
    encoder: &OneHotEncoder,
    model_features: &[S],
    records: &[ProjectRecord],
) -> Result<Vec<Vec<f64>>, EncodingError> {
    records
        .iter()
        .map(|record| {
            encode_record(encoder, record)
                .map(|frame| frame.reindex(model_features).values().to_vec())
        })
        .collect()
}

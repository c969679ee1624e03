use rand::Rng;

use super::history::generate_historical_data;
use super::hotspots::{TOP_HOTSPOTS, top_hotspots};
use super::risk::categorize_hotspots;
use super::{CONFIDENCE_SCORE, PredictionOutput, ProjectInput, round_to};
use crate::artifacts::{ArtifactError, ModelArtifacts};
use crate::encoding::{EncodingError, encode_project_row};
use crate::ml::shap::TreeExplainer;
use crate::project::features::INFERENCE_DELAY_TOPIC;
use crate::project::{geospatial_risk_score, vendor_sentiment_score};

/// Loaded models plus everything needed to answer a prediction request.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifacts: ModelArtifacts,
}

impl Predictor {
    pub fn new(artifacts: ModelArtifacts) -> Result<Self, ArtifactError> {
        artifacts.validate()?;
        Ok(Self { artifacts })
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Feature row for `input`, aligned to the saved `model_features` order.
    pub fn feature_row(&self, input: &ProjectInput) -> Result<Vec<f64>, EncodingError> {
        let frame = encode_project_row(
            &self.artifacts.encoder,
            geospatial_risk_score(&input.terrain),
            vendor_sentiment_score(&input.vendor_performance),
            &input.project_type,
            INFERENCE_DELAY_TOPIC.label(),
        )?;
        Ok(frame.reindex(&self.artifacts.model_features).values().to_vec())
    }

    pub fn predict(&self, input: &ProjectInput) -> Result<PredictionOutput, EncodingError> {
        self.predict_with_rng(input, &mut rand::rng())
    }

    /// Full pipeline with a caller-supplied generator for the history series.
    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        input: &ProjectInput,
        rng: &mut R,
    ) -> Result<PredictionOutput, EncodingError> {
        let row = self.feature_row(input)?;
        let time = self.artifacts.time_model.predict(&row);
        let cost = self.artifacts.cost_model.predict(&row);

        let shap_values = TreeExplainer::new(&self.artifacts.time_model).shap_values(&row);
        let hotspots = top_hotspots(
            &self.artifacts.model_features,
            &shap_values,
            input,
            TOP_HOTSPOTS,
        );
        let risk_categories = categorize_hotspots(&hotspots);
        let historical_data = generate_historical_data(&input.project_type, rng);

        tracing::debug!(
            project = %input.project_name,
            time,
            cost,
            "Scored project"
        );
        Ok(PredictionOutput {
            predicted_cost_overrun: round_to(cost, 2),
            predicted_time_overrun: time.round_ties_even().max(0.0) as i64,
            confidence_score: CONFIDENCE_SCORE,
            hotspots,
            historical_data,
            risk_categories,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::dataset::{GenerateOptions, generate_projects};
    use crate::ml::gbdt::TrainOptions;
    use crate::training::{TrainingOptions, train_artifacts};

    /// Small but fully trained predictor.
    pub(crate) fn trained_predictor() -> Predictor {
        let records = generate_projects(&GenerateOptions {
            rows: 300,
            seed: Some(5),
        });
        let options = TrainingOptions {
            gbdt: TrainOptions {
                rounds: 20,
                learning_rate: 0.2,
                max_depth: 4,
                ..TrainOptions::default()
            },
            ..TrainingOptions::default()
        };
        let report = train_artifacts(&records, &options).unwrap();
        Predictor::new(report.artifacts).unwrap()
    }

    pub(crate) fn substation_input() -> ProjectInput {
        ProjectInput {
            project_name: "Bayview Substation".into(),
            project_type: "Substation".into(),
            terrain: "Plains".into(),
            vendor_performance: "Good".into(),
            material_availability: "High".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{substation_input, trained_predictor};
    use super::*;
    use crate::project::{ProjectType, Terrain, VendorPerformance};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn substation_prediction_has_expected_shape() {
        let predictor = trained_predictor();
        let output = predictor
            .predict_with_rng(&substation_input(), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert!(output.predicted_time_overrun >= 0);
        assert_eq!(output.confidence_score, 88.7);
        assert_eq!(output.hotspots.len(), 5);
        assert_eq!(output.historical_data.overruns.len(), 30);
        assert!(
            output
                .historical_data
                .overruns
                .iter()
                .all(|v| (10..=60).contains(v))
        );
        let impacts: Vec<f64> = output.hotspots.iter().map(|h| h.impact.abs()).collect();
        assert!(impacts.windows(2).all(|w| w[0] >= w[1]), "{impacts:?}");
    }

    #[test]
    fn negative_time_estimate_is_clamped_to_zero() {
        let mut artifacts = trained_predictor().artifacts().clone();
        artifacts.time_model.base_score = -10_000.0;
        let predictor = Predictor::new(artifacts).unwrap();
        let input = substation_input();
        let row = predictor.feature_row(&input).unwrap();
        assert!(predictor.artifacts().time_model.predict(&row) < 0.0);

        let output = predictor.predict(&input).unwrap();
        assert_eq!(output.predicted_time_overrun, 0);
    }

    #[test]
    fn feature_rows_align_for_every_known_input() {
        let predictor = trained_predictor();
        let features = &predictor.artifacts().model_features;
        for project_type in ProjectType::ALL {
            for terrain in Terrain::ALL {
                for vendor in VendorPerformance::ALL {
                    let input = ProjectInput {
                        project_type: project_type.label().into(),
                        terrain: terrain.label().into(),
                        vendor_performance: vendor.label().into(),
                        ..substation_input()
                    };
                    let row = predictor.feature_row(&input).unwrap();
                    assert_eq!(row.len(), features.len());
                    assert!(row.iter().all(|v| v.is_finite()));
                    let hot = row[2..].iter().filter(|v| **v == 1.0).count();
                    assert_eq!(hot, 2, "{input:?}");
                }
            }
        }
    }

    #[test]
    fn unknown_labels_still_predict() {
        let predictor = trained_predictor();
        let input = ProjectInput {
            project_type: "Pipeline".into(),
            terrain: "Desert".into(),
            vendor_performance: "Unrated".into(),
            ..substation_input()
        };
        let row = predictor.feature_row(&input).unwrap();
        assert_eq!(&row[..2], &[0.0, 0.0]);
        let output = predictor.predict(&input).unwrap();
        assert_eq!(output.hotspots.len(), 5);
        assert!(output.predicted_time_overrun >= 0);
    }

    #[test]
    fn hotspots_explain_the_time_prediction() {
        let predictor = trained_predictor();
        let input = ProjectInput {
            terrain: "Hilly".into(),
            vendor_performance: "Poor".into(),
            ..substation_input()
        };
        let row = predictor.feature_row(&input).unwrap();
        let model = &predictor.artifacts().time_model;
        let phi = TreeExplainer::new(model).shap_values(&row);
        let reconstructed = TreeExplainer::new(model).expected_value() + phi.iter().sum::<f64>();
        assert!((reconstructed - model.predict(&row)).abs() < 1e-6);

        let output = predictor.predict(&input).unwrap();
        let mut leaders: Vec<&str> = output.hotspots[..2]
            .iter()
            .map(|h| h.feature.as_str())
            .collect();
        leaders.sort();
        assert_eq!(leaders, ["Geospatial Risk Score", "Vendor Sentiment Score"]);
        let categories: Vec<&str> = output
            .risk_categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(&categories[..2], ["Geospatial", "Vendor-Related"]);
    }
}

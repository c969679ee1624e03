//! Turning SHAP values into the top-N human-readable hotspots.

use serde::{Deserialize, Serialize};

use super::{ProjectInput, round_to};
use crate::project::features::{
    GEOSPATIAL_RISK_SCORE, NLP_DELAY_TOPIC, PROJECT_TYPE, VENDOR_SENTIMENT_SCORE,
};

/// Number of hotspots reported per prediction.
pub const TOP_HOTSPOTS: usize = 5;

const GENERIC_DESCRIPTION: &str = "This factor has a notable influence on the project's outcome.";

/// A feature that moved the time prediction, with its signed impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Display name, e.g. `Geospatial Risk Score`.
    pub feature: String,
    /// SHAP value rounded to two decimals.
    pub impact: f64,
    pub description: String,
}

/// Keep the `k` largest attributions by magnitude, in descending order.
///
/// Ties keep feature column order.
pub fn top_hotspots(
    feature_names: &[String],
    shap_values: &[f64],
    input: &ProjectInput,
    k: usize,
) -> Vec<Hotspot> {
    let mut ranked: Vec<(usize, f64)> = shap_values.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    ranked
        .into_iter()
        .take(k)
        .filter_map(|(idx, value)| {
            let name = feature_names.get(idx)?;
            Some(Hotspot {
                feature: display_name(name),
                impact: round_to(value, 2),
                description: describe(name, input),
            })
        })
        .collect()
}

/// First template whose key is a substring of the raw column name.
pub fn describe(feature: &str, input: &ProjectInput) -> String {
    let templates: [(&str, fn(&ProjectInput) -> String); 4] = [
        (GEOSPATIAL_RISK_SCORE, |input: &ProjectInput| {
            format!(
                "The terrain '{}' significantly impacts the project timeline due to logistical and construction challenges.",
                input.terrain
            )
        }),
        (VENDOR_SENTIMENT_SCORE, |input: &ProjectInput| {
            format!(
                "The vendor's performance level ('{}') is a major factor in potential delays or efficiencies.",
                input.vendor_performance
            )
        }),
        (PROJECT_TYPE, |input: &ProjectInput| {
            format!(
                "The nature of a '{}' project has inherent risks and timelines.",
                input.project_type
            )
        }),
        (NLP_DELAY_TOPIC, |_: &ProjectInput| {
            "The primary source of delay is related to project execution.".to_string()
        }),
    ];
    templates
        .iter()
        .find(|(key, _)| feature.contains(*key))
        .map(|(_, render)| render(input))
        .unwrap_or_else(|| GENERIC_DESCRIPTION.to_string())
}

/// `project_type_Overhead Line` -> `Project Type Overhead Line`.
///
/// Underscores become spaces; each alphabetic run starts upper case and
/// continues lower case.
pub fn display_name(feature: &str) -> String {
    let mut out = String::with_capacity(feature.len());
    let mut prev_alpha = false;
    for ch in feature.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProjectInput {
        ProjectInput {
            project_name: "X".into(),
            project_type: "Substation".into(),
            terrain: "Hilly".into(),
            vendor_performance: "Poor".into(),
            material_availability: "Low".into(),
        }
    }

    #[test]
    fn display_names_are_title_cased() {
        assert_eq!(display_name("geospatial_risk_score"), "Geospatial Risk Score");
        assert_eq!(
            display_name("project_type_Overhead Line"),
            "Project Type Overhead Line"
        );
        assert_eq!(
            display_name("nlp_delay_topic_Land_Acquisition"),
            "Nlp Delay Topic Land Acquisition"
        );
        assert_eq!(display_name("abc2def"), "Abc2Def");
    }

    #[test]
    fn descriptions_interpolate_inputs() {
        let input = input();
        assert!(describe("geospatial_risk_score", &input).contains("'Hilly'"));
        assert!(describe("vendor_sentiment_score", &input).contains("('Poor')"));
        assert!(describe("project_type_Substation", &input).contains("'Substation' project"));
        assert_eq!(
            describe("nlp_delay_topic_Execution", &input),
            "The primary source of delay is related to project execution."
        );
        assert_eq!(describe("budget_slack", &input), GENERIC_DESCRIPTION);
    }

    #[test]
    fn keeps_top_k_by_magnitude() {
        let names: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let hotspots = top_hotspots(&names, &[0.1, -3.456, 2.0, -2.0], &input(), 3);
        let features: Vec<&str> = hotspots.iter().map(|h| h.feature.as_str()).collect();
        assert_eq!(features, ["B", "C", "D"]);
        assert_eq!(hotspots[0].impact, -3.46);
        assert_eq!(hotspots[2].impact, -2.0);
    }
}

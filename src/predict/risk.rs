use serde::{Deserialize, Serialize};

use super::hotspots::Hotspot;
use super::round_to;

/// Share of the positive attribution that falls into one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCategory {
    pub category: String,
    /// Percentage rounded to one decimal.
    pub percentage: f64,
}

/// Fixed risk buckets, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBucket {
    Geospatial,
    VendorRelated,
    SupplyChain,
    Execution,
}

impl RiskBucket {
    pub const ALL: [RiskBucket; 4] = [
        RiskBucket::Geospatial,
        RiskBucket::VendorRelated,
        RiskBucket::SupplyChain,
        RiskBucket::Execution,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RiskBucket::Geospatial => "Geospatial",
            RiskBucket::VendorRelated => "Vendor-Related",
            RiskBucket::SupplyChain => "Supply Chain",
            RiskBucket::Execution => "Execution",
        }
    }

    /// First match on the hotspot display name wins.
    pub fn for_feature(feature: &str) -> Self {
        if feature.contains("Terrain") || feature.contains("Geospatial") {
            RiskBucket::Geospatial
        } else if feature.contains("Vendor") {
            RiskBucket::VendorRelated
        } else if feature.contains("Material") {
            RiskBucket::SupplyChain
        } else {
            RiskBucket::Execution
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Group positive-impact hotspots into the fixed buckets by share of impact.
///
/// Returns an empty list when no hotspot has a positive impact; buckets with
/// no positive impact are omitted.
pub fn categorize_hotspots(hotspots: &[Hotspot]) -> Vec<RiskCategory> {
    let positive: Vec<&Hotspot> = hotspots.iter().filter(|h| h.impact > 0.0).collect();
    if positive.is_empty() {
        return Vec::new();
    }
    let total: f64 = positive.iter().map(|h| h.impact).sum();

    let mut sums = [0.0f64; 4];
    for hotspot in &positive {
        sums[RiskBucket::for_feature(&hotspot.feature).index()] += hotspot.impact;
    }

    RiskBucket::ALL
        .iter()
        .zip(sums)
        .filter(|(_, sum)| *sum > 0.0)
        .map(|(bucket, sum)| RiskCategory {
            category: bucket.label().to_string(),
            percentage: round_to(sum / total * 100.0, 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotspot(feature: &str, impact: f64) -> Hotspot {
        Hotspot {
            feature: feature.to_string(),
            impact,
            description: String::new(),
        }
    }

    #[test]
    fn no_positive_impact_yields_no_categories() {
        assert!(categorize_hotspots(&[]).is_empty());
        let negatives = [hotspot("Geospatial Risk Score", -4.0), hotspot("X", 0.0)];
        assert!(categorize_hotspots(&negatives).is_empty());
    }

    #[test]
    fn buckets_by_first_match_in_fixed_order() {
        let hotspots = [
            hotspot("Vendor Sentiment Score", 3.0),
            hotspot("Geospatial Risk Score", 6.0),
            hotspot("Project Type Substation", 1.0),
            hotspot("Terrain Vendor Mix", 2.0),
            hotspot("Nlp Delay Topic Execution", -5.0),
        ];
        let categories = categorize_hotspots(&hotspots);
        assert_eq!(
            categories,
            vec![
                RiskCategory {
                    category: "Geospatial".into(),
                    percentage: 66.7
                },
                RiskCategory {
                    category: "Vendor-Related".into(),
                    percentage: 25.0
                },
                RiskCategory {
                    category: "Execution".into(),
                    percentage: 8.3
                },
            ]
        );
    }

    #[test]
    fn material_features_count_as_supply_chain() {
        let categories = categorize_hotspots(&[hotspot("Material Availability Low", 0.5)]);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].category, "Supply Chain");
        assert_eq!(categories[0].percentage, 100.0);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let hotspots = [
            hotspot("Geospatial Risk Score", 1.37),
            hotspot("Vendor Sentiment Score", 2.11),
            hotspot("Material Shortage", 0.73),
            hotspot("Project Type Substation", 0.19),
        ];
        let total: f64 = categorize_hotspots(&hotspots)
            .iter()
            .map(|c| c.percentage)
            .sum();
        assert!((total - 100.0).abs() <= 0.1 + 1e-9, "{total}");
    }
}

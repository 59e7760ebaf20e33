//! Canned insight text served by `/api/insights`.
//!
//! Stands in for a real model behind the same `{prompt} -> {insight}` contract:
//! one of four template sentences, picked uniformly, with randomised fill-ins.

use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_INSIGHT: &str = "Comprehensive data analysis completed. The metrics show positive \
     trends with opportunities for strategic optimization in key performance areas.";

const OPPORTUNITY_TOPICS: [&str; 4] = [
    "user engagement",
    "conversion rates",
    "operational efficiency",
    "market expansion",
];

/// Produce one canned insight sentence
pub fn canned_insight<R: Rng + ?Sized>(rng: &mut R) -> String {
    match rng.gen_range(0..4) {
        0 => format!(
            "Analysis of the data reveals positive growth trends with consistent performance \
             metrics. Key indicators suggest {} growth patterns.",
            if rng.gen_bool(0.5) {
                "accelerating"
            } else {
                "stable"
            }
        ),
        1 => format!(
            "The dataset shows strong correlation between engagement metrics and overall \
             performance. {} for improved outcomes.",
            if rng.gen_bool(0.5) {
                "Focus on scaling successful initiatives"
            } else {
                "Consider optimizing underperforming segments"
            }
        ),
        2 => format!(
            "Metrics indicate successful strategy implementation with {}% improvement in key \
             areas. Seasonal variations present opportunities for optimization.",
            rng.gen_range(5..30)
        ),
        _ => format!(
            "Data patterns demonstrate reliable performance with emerging opportunities in {}. \
             Strategic focus could enhance results.",
            OPPORTUNITY_TOPICS
                .choose(rng)
                .copied()
                .unwrap_or(OPPORTUNITY_TOPICS[0])
        ),
    }
}

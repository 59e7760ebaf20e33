pub mod aggregation;
pub mod forecast_cycle;
pub mod insight_stub;
pub mod insights;
pub mod recommend;
pub mod rules;

pub use forecast_cycle::{CycleOutcome, CycleReport, ForecastService};
pub use recommend::RecommendationService;
pub use rules::CropRulesEngine;

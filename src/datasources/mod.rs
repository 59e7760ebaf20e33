pub mod insight_service;
pub mod openweathermap;

pub use insight_service::InsightServiceClient;
pub use openweathermap::OpenWeatherMapClient;

use crate::error::Result;
use crate::models::RawSample;
use async_trait::async_trait;

/// Provider of raw sub-daily samples for a named region
#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn fetch_samples(&self, region: &str) -> Result<Vec<RawSample>>;
}

/// Remote text generator; returns the raw JSON body so callers can tolerate
/// provider shape variance
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value>;
}

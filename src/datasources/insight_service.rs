use super::InsightGenerator;
use crate::config::InsightsConfig;
use crate::error::{FarmcastError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub struct InsightServiceClient {
    client: reqwest::Client,
    config: InsightsConfig,
}

#[derive(Debug, Serialize)]
struct InsightRequest<'a> {
    prompt: &'a str,
}

impl InsightServiceClient {
    pub fn new(config: InsightsConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    fn post(&self, prompt: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .post(&self.config.url)
            .json(&InsightRequest { prompt });

        match self.config.api_key {
            Some(ref key) => request.bearer_auth(key),
            None => request,
        }
    }

    pub async fn request(&self, prompt: &str) -> Result<serde_json::Value> {
        let response = self
            .post(prompt)
            .send()
            .await
            .map_err(|e| FarmcastError::InsightService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FarmcastError::InsightService(format!(
                "Insight service returned {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            FarmcastError::InsightService(format!("Failed to parse insight response: {}", e))
        })
    }

    /// Probe the insight service with a throwaway prompt
    pub async fn test_connection(&self) -> Result<bool> {
        let response = self
            .post("ping")
            .send()
            .await
            .map_err(|e| FarmcastError::InsightService(format!("Request failed: {}", e)))?;

        Ok(response.status().is_success())
    }
}

#[async_trait]
impl InsightGenerator for InsightServiceClient {
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value> {
        tracing::debug!(url = %self.config.url, "Requesting insights");
        self.request(prompt).await
    }
}

use super::SampleSource;
use crate::config::OpenWeatherMapConfig;
use crate::error::{FarmcastError, Result};
use crate::models::RawSample;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
    city: OwmCity,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    #[serde(default)]
    rain: Option<OwmPrecipitation>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmPrecipitation {
    #[serde(rename = "3h", default)]
    three_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    #[allow(dead_code)]
    name: String,
    /// Shift in seconds from UTC
    #[serde(default)]
    timezone: i32,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str, region: &str) -> Result<Url> {
        let base = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        Url::parse_with_params(
            &base,
            &[
                ("q", format!("{},{}", region, self.config.country_code)),
                ("appid", self.config.api_key.clone()),
                ("units", "metric".to_string()),
            ],
        )
        .map_err(|e| FarmcastError::Config(format!("Invalid OpenWeatherMap URL: {}", e)))
    }

    /// Fetch the 5-day/3-hour forecast for a city
    pub async fn fetch_forecast(&self, region: &str) -> Result<Vec<RawSample>> {
        let url = self.endpoint("forecast", region)?;

        let response =
            self.client.get(url).send().await.map_err(|e| {
                FarmcastError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FarmcastError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let owm_response: OwmForecastResponse = response.json().await.map_err(|e| {
            FarmcastError::DataSourceUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e
            ))
        })?;

        Ok(convert_response(owm_response))
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self, region: &str) -> Result<bool> {
        let url = self.endpoint("weather", region)?;

        let response =
            self.client.get(url).send().await.map_err(|e| {
                FarmcastError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        Ok(response.status().is_success())
    }
}

#[async_trait]
impl SampleSource for OpenWeatherMapClient {
    async fn fetch_samples(&self, region: &str) -> Result<Vec<RawSample>> {
        self.fetch_forecast(region).await
    }
}

fn convert_response(response: OwmForecastResponse) -> Vec<RawSample> {
    let offset = FixedOffset::east_opt(response.city.timezone).unwrap_or_else(|| {
        warn!(
            timezone = response.city.timezone,
            "Invalid city timezone from OpenWeatherMap, using UTC"
        );
        Utc.fix()
    });

    response
        .list
        .iter()
        .filter_map(|item| convert_forecast_item(item, offset))
        .collect()
}

fn convert_forecast_item(item: &OwmForecastItem, offset: FixedOffset) -> Option<RawSample> {
    let Some(timestamp) = DateTime::from_timestamp(item.dt, 0) else {
        warn!(dt = item.dt, "Skipping forecast entry with invalid timestamp");
        return None;
    };

    let precipitation_mm = item.rain.as_ref().and_then(|r| r.three_hour);

    Some(RawSample::new(
        timestamp.with_timezone(&offset),
        item.main.temp,
        precipitation_mm,
    ))
}

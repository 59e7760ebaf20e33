use super::AppState;
use crate::error::{FarmcastError, Result};
use crate::logic::insight_stub::{canned_insight, DEFAULT_INSIGHT};
use crate::logic::CycleReport;
use crate::models::{
    CropRecommendation, HistoryEntry, InsightLogEntry, RecommendationRequest,
    RecommendationResponse,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_INSIGHT_LIMIT: usize = 20;
const MAX_INSIGHT_LIMIT: usize = 200;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_regions(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "regions": state.config.forecast.regions,
        "defaultRegion": state.config.forecast.default_region,
    }))
}

#[derive(Debug, Deserialize)]
pub struct InsightPrompt {
    #[serde(default)]
    pub prompt: String,
}

/// Canned insight text generator. Unreadable bodies get the default text
/// straight away, still with a 200.
pub async fn generate_insight(
    State(state): State<AppState>,
    body: std::result::Result<Json<InsightPrompt>, JsonRejection>,
) -> Json<Value> {
    match body {
        Ok(Json(request)) => {
            tracing::debug!(prompt_len = request.prompt.len(), "Insight prompt received")
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable insight request");
            return Json(json!({ "insight": DEFAULT_INSIGHT }));
        }
    }

    tokio::time::sleep(state.config.insights.simulated_latency()).await;

    let insight = canned_insight(&mut rand::thread_rng());
    Json(json!({ "insight": insight }))
}

#[derive(Debug, Deserialize)]
pub struct InsightLogQuery {
    pub region: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_insights(
    State(state): State<AppState>,
    Query(query): Query<InsightLogQuery>,
) -> Result<Json<Vec<InsightLogEntry>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_INSIGHT_LIMIT)
        .min(MAX_INSIGHT_LIMIT);
    let entries = state
        .db
        .recent_insight_logs(query.region.as_deref(), limit)?;
    Ok(Json(entries))
}

pub async fn recommend_crops(
    State(state): State<AppState>,
    body: std::result::Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<RecommendationResponse>> {
    let Json(request) = body.map_err(|e| FarmcastError::InvalidData(e.body_text()))?;
    let record = state.recommendations.recommend(&request)?;
    Ok(Json(record.into()))
}

#[derive(Debug, Deserialize)]
pub struct FarmerQuery {
    pub farmer_id: Option<String>,
}

pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(query): Query<FarmerQuery>,
) -> Result<Json<Vec<CropRecommendation>>> {
    let farmer_id = query
        .farmer_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| FarmcastError::InvalidData("farmer_id is required".into()))?;
    Ok(Json(state.recommendations.history(&farmer_id)?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub report: CycleReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Run one aggregate cycle for the region
pub async fn run_forecast(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<ForecastResponse>> {
    let region = region.trim();
    if region.is_empty() {
        return Err(FarmcastError::InvalidData("region must not be empty".into()));
    }

    let (report, warning) = state.forecasts.run_cycle(region).await.into_result()?;

    Ok(Json(ForecastResponse {
        status: if warning.is_some() { "degraded" } else { "ok" },
        report,
        warning,
    }))
}

/// Last published cycle report; failed and superseded cycles never replace it
pub async fn latest_forecast(State(state): State<AppState>) -> Result<Json<CycleReport>> {
    state
        .forecasts
        .current()
        .await
        .map(Json)
        .ok_or_else(|| FarmcastError::NotFound("no forecast has been published yet".into()))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub region: Option<String>,
}

pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>> {
    Ok(Json(state.db.forecast_history(query.region.as_deref())?))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::datasources::{InsightGenerator, SampleSource};
    use crate::db::Database;
    use crate::error::{FarmcastError, Result};
    use crate::logic::insight_stub::DEFAULT_INSIGHT;
    use crate::logic::ForecastService;
    use crate::models::RawSample;
    use crate::server::{router, AppState};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use chrono::{Duration, FixedOffset, TimeZone};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FixedSamples;

    #[async_trait]
    impl SampleSource for FixedSamples {
        async fn fetch_samples(&self, region: &str) -> Result<Vec<RawSample>> {
            if region == "Atlantis" {
                return Err(FarmcastError::DataSourceUnavailable(
                    "OpenWeatherMap returned 404 Not Found".into(),
                ));
            }
            let start = FixedOffset::east_opt(3 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 3, 0, 0, 0)
                .unwrap();
            Ok((0..8)
                .map(|i| RawSample::new(start + Duration::hours(3 * i), 18.0, Some(1.0)))
                .collect())
        }
    }

    struct FixedInsights(Value);

    #[async_trait]
    impl InsightGenerator for FixedInsights {
        async fn generate(&self, _prompt: &str) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    fn app_with_insights(insights: Value) -> Router {
        let mut config = Config::default();
        config.insights.simulated_latency_ms = 0;
        let db = Database::open_in_memory().unwrap();
        let forecasts = ForecastService::new(
            &config.forecast,
            db.clone(),
            Arc::new(FixedSamples),
            Arc::new(FixedInsights(insights)),
        );
        router(AppState::new(config, db, forecasts))
    }

    fn app() -> Router {
        app_with_insights(json!({ "insight": "1. Plant now.\n2. Keep drains clear.\n3. Mulch." }))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(&app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn regions_list_configured_cities() {
        let (status, body) = send(&app(), get("/api/regions")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["defaultRegion"], "Nairobi");
        assert_eq!(body["regions"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn crop_recommendation_round_trip() {
        let app = app();
        let (status, body) = send(
            &app,
            post_json(
                "/api/crop-recommend",
                r#"{"soilType":"Loam","rainfall":60,"temperature":28,"farmerId":"farmer-7"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["recommendations"],
            json!(["Maize", "Beans", "Sorghum", "Cotton"])
        );
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get("/api/recommendations?farmer_id=farmer-7")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], id);
    }

    #[tokio::test]
    async fn malformed_recommendation_is_rejected() {
        let (status, body) = send(
            &app(),
            post_json("/api/crop-recommend", r#"{"soilType":"clay"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn recommendations_require_farmer() {
        let (status, _) = send(&app(), get("/api/recommendations")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn insight_stub_answers_prompt() {
        let (status, body) = send(
            &app(),
            post_json("/api/insights", r#"{"prompt":"Forecast for Nairobi"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["insight"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn insight_stub_tolerates_garbage() {
        let (status, body) = send(&app(), post_json("/api/insights", "not json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["insight"], DEFAULT_INSIGHT);
    }

    #[tokio::test]
    async fn forecast_cycle_and_history() {
        let app = app();
        let (status, body) = send(&app, get("/api/forecast/Nairobi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["region"], "Nairobi");
        assert_eq!(body["forecast"][0]["dayLabel"], "Mon");
        assert_eq!(body["insights"].as_array().unwrap().len(), 3);
        assert!(body.get("warning").is_none());

        let (status, body) = send(&app, get("/api/history?region=Nairobi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, body) = send(&app, get("/api/insights?region=Nairobi")).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn degraded_forecast_carries_warning() {
        let app = app_with_insights(json!({ "unexpected": true }));
        let (status, body) = send(&app, get("/api/forecast/Mombasa")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert!(body["warning"].is_string());
        assert_eq!(
            body["insights"][0]["description"],
            "Monitor soil moisture in Mombasa."
        );
    }

    #[tokio::test]
    async fn fetch_failure_maps_to_bad_gateway() {
        let (status, body) = send(&app(), get("/api/forecast/Atlantis")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn latest_forecast_survives_failed_cycle() {
        let app = app();
        let (status, _) = send(&app, get("/api/forecast")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(&app, get("/api/forecast/Kisumu")).await;
        send(&app, get("/api/forecast/Atlantis")).await;

        let (status, body) = send(&app, get("/api/forecast")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["region"], "Kisumu");
    }

    #[tokio::test]
    async fn oversized_bodies_are_refused() {
        let big = format!(r#"{{"prompt":"{}"}}"#, "x".repeat(crate::server::MAX_BODY_BYTES));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/crop-recommend")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, big.len())
            .body(Body::from(big))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

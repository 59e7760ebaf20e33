//! HTTP API

mod handlers;

use crate::config::Config;
use crate::db::Database;
use crate::error::{FarmcastError, Result};
use crate::logic::{ForecastService, RecommendationService};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub forecasts: Arc<ForecastService>,
    pub recommendations: RecommendationService,
}

impl AppState {
    pub fn new(config: Config, db: Database, forecasts: ForecastService) -> Self {
        Self {
            config: Arc::new(config),
            recommendations: RecommendationService::new(db.clone()),
            db,
            forecasts: Arc::new(forecasts),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/regions", get(handlers::list_regions))
        .route(
            "/api/insights",
            post(handlers::generate_insight).get(handlers::list_insights),
        )
        .route("/api/crop-recommend", post(handlers::recommend_crops))
        .route("/api/recommendations", get(handlers::list_recommendations))
        .route("/api/forecast", get(handlers::latest_forecast))
        .route("/api/forecast/{region}", get(handlers::run_forecast))
        .route("/api/history", get(handlers::list_history))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(state: AppState) -> Result<()> {
    let bind = state.config.server.bind.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| FarmcastError::Config(format!("Cannot bind {}: {}", bind, e)))?;
    tracing::info!(address = %bind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

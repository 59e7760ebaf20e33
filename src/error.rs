use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FarmcastError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Insight service error: {0}")]
    InsightService(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forecast cycle for {0} was superseded by a newer request")]
    Superseded(String),
}

pub type Result<T> = std::result::Result<T, FarmcastError>;

impl FarmcastError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FarmcastError::InvalidData(_) | FarmcastError::Json(_) => StatusCode::BAD_REQUEST,
            FarmcastError::NotFound(_) => StatusCode::NOT_FOUND,
            FarmcastError::Superseded(_) => StatusCode::CONFLICT,
            FarmcastError::Http(_)
            | FarmcastError::DataSourceUnavailable(_)
            | FarmcastError::InsightService(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FarmcastError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_failure_tier() {
        assert_eq!(
            FarmcastError::InvalidData("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FarmcastError::Superseded("Nairobi".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            FarmcastError::DataSourceUnavailable("owm".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            FarmcastError::LockPoisoned.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Routing API error: {0}")]
    RoutingApi(String),

    #[error("Elevation API error: {0}")]
    ElevationApi(String),

    #[error("Overpass API error: {0}")]
    OverpassApi(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No route found: {0}")]
    NoRouteFound(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::RoutingApi(ref e) => {
                tracing::error!("Routing API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Routing service error")
            }
            AppError::ElevationApi(ref e) => {
                tracing::error!("Elevation API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Elevation service error")
            }
            AppError::OverpassApi(ref e) => {
                tracing::error!("Overpass API error: {}", e);
                (StatusCode::BAD_GATEWAY, "POI service error")
            }
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.as_str()),
            AppError::NoRouteFound(ref e) => {
                tracing::info!("No route found: {}", e);
                (StatusCode::NOT_FOUND, e.as_str())
            }
            AppError::Export(ref e) => {
                tracing::warn!("Export failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.as_str())
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::RoutingApi("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NoRouteFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_display_includes_context() {
        let error = AppError::OverpassApi("HTTP 429".to_string());
        assert_eq!(error.to_string(), "Overpass API error: HTTP 429");
    }
}

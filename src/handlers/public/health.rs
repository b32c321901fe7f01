use axum::{extract::State, http::StatusCode, response::{IntoResponse, Json, Response}};
use chrono::Utc;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn get(State(state): State<AppState>) -> Response {
    match state.repo.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "healthy",
                    "store": "up",
                    "timestamp": Utc::now(),
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("Data store is unavailable").into_response()
        }
    }
}

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Student API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "public": "POST /api/registration, POST /api/login, GET /health",
                "protected": "GET /api/profile, /api/students[/:id] (Authorization: Bearer <token>)"
            }
        }
    }))
}

/// GET /health - store connectivity check
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.students.health().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok"
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("database unavailable").into_response()
        }
    }
}

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::StudentPayload;
use crate::AppState;

/// POST /api/registration - Register a new student account
///
/// Input: `{"name", "email", "password", "age"}`. Every invalid field is
/// reported in one 400 response; an email that is already registered is 409.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let id = state.students.register(payload).await?;

    Ok(ApiResponse::created(json!({
        "id": id,
        "message": "User registered"
    })))
}

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::StudentResponse;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::StudentPayload;
use crate::AppState;

/// GET /api/students - list every student
pub async fn students_get(State(state): State<AppState>) -> ApiResult<Vec<StudentResponse>> {
    Ok(ApiResponse::success(state.students.list().await?))
}

/// POST /api/students - create a student; same rules as registration
pub async fn students_post(
    State(state): State<AppState>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let id = state.students.create(payload).await?;
    tracing::info!("Student created, id: {}", id);
    Ok(ApiResponse::created(json!({ "id": id })))
}

/// GET /api/students/:id
pub async fn student_get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StudentResponse> {
    let Path(id) = id?;
    Ok(ApiResponse::success(state.students.get(id).await?))
}

/// PUT /api/students/:id - replace name, email and age; password only when given
pub async fn student_put(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> ApiResult<StudentResponse> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    Ok(ApiResponse::success(state.students.update(id, payload).await?))
}

/// DELETE /api/students/:id
pub async fn student_delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = id?;
    state.students.delete(id).await?;
    Ok(ApiResponse::success(json!({ "id": id })))
}

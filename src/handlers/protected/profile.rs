use axum::{extract::State, Extension};

use crate::database::models::StudentResponse;
use crate::middleware::{ApiResponse, ApiResult, Session};
use crate::AppState;

/// GET /api/profile - the authenticated student's own record, without password
pub async fn profile_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<StudentResponse> {
    let profile = state.students.profile(&session).await?;
    Ok(ApiResponse::success(profile))
}

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginRequest, LoginResponse};
use crate::AppState;

/// POST /api/login - Authenticate and receive a JWT
///
/// Input: `{"email", "password"}`. Output:
/// ```json
/// {
///   "success": true,
///   "data": { "token": "eyJhbGciOiJIUzI1NiI...", "token_type": "Bearer", "expires_in": 86400 }
/// }
/// ```
/// Unknown email and wrong password both answer 401 "invalid email or password".
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let response = state.students.login(request).await?;
    Ok(ApiResponse::success(response))
}

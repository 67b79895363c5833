use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, TokenService};
use crate::error::ApiError;
use crate::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Verified identity for the current request.
///
/// Only ever built from a token that passed verification; handlers receive
/// it as `Extension<Session>` and never re-verify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub email: String,
}

/// JWT authentication middleware that validates tokens and injects the session.
///
/// Every failure is answered with the same 401 body; the reason is only logged.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = authenticate(request.headers(), state.tokens.as_ref()).map_err(|e| {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Extract and verify the bearer token carried by `headers`
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<Session, AuthError> {
    let token = extract_bearer_token(headers)?;
    let email = tokens.verify(token)?;
    Ok(Session { email })
}

/// Extract the raw token from the Authorization header.
///
/// A missing header, another scheme, or an empty token are all treated as
/// no credential at all.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_str = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    let token = auth_str
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthError::MissingCredential)?;

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(token)
}

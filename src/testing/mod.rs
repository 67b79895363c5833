//! Helpers shared by the unit and router tests

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use crate::auth::{PasswordHasher, TokenService};
use crate::database::sqlite::SqliteStore;
use crate::database::DatabaseManager;
use crate::services::StudentService;
use crate::AppState;

pub const TEST_SECRET: &[u8] = b"unit-test-secret-that-is-long-enough";

/// Lowest bcrypt cost; keeps hashing fast in tests
pub const TEST_BCRYPT_COST: u32 = 4;

/// Fresh, isolated in-memory SQLite database
pub async fn memory_pool() -> SqlitePool {
    DatabaseManager::sqlite_pool("sqlite::memory:", 1, Duration::from_secs(5))
        .await
        .expect("in-memory sqlite pool")
}

pub async fn test_state() -> AppState {
    let store = SqliteStore::new(memory_pool().await).await.expect("sqlite schema");
    let hasher = PasswordHasher::new(TEST_BCRYPT_COST).expect("hasher");
    let tokens = Arc::new(TokenService::new(TEST_SECRET).expect("token service"));
    AppState::from_parts(Arc::new(store), hasher, tokens)
}

pub async fn test_service() -> StudentService {
    test_state().await.students
}

/// Drive one request through the router and decode the JSON body
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    into_parts(router.clone().oneshot(request).await.expect("response")).await
}

/// Like [`send`] but with a raw JSON body, for malformed payloads
pub async fn send_raw(router: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");

    into_parts(router.clone().oneshot(request).await.expect("response")).await
}

async fn into_parts(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

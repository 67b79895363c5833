pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod validation;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthError, PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::StudentStore;
use crate::services::StudentService;

/// Shared state handed to every handler and to the auth middleware
#[derive(Clone)]
pub struct AppState {
    pub students: StudentService,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wire the service graph from config and an already connected store
    pub fn new(config: &AppConfig, store: Arc<dyn StudentStore>) -> Result<Self, AuthError> {
        let tokens = Arc::new(TokenService::new(config.security.jwt_secret.as_bytes())?);
        let hasher = PasswordHasher::new(config.security.bcrypt_cost)?;
        tracing::debug!("Password hashing at bcrypt cost {}", hasher.cost());
        Ok(Self::from_parts(store, hasher, tokens))
    }

    pub fn from_parts(store: Arc<dyn StudentStore>, hasher: PasswordHasher, tokens: Arc<TokenService>) -> Self {
        Self {
            students: StudentService::new(store, hasher, Arc::clone(&tokens)),
            tokens,
        }
    }
}

/// Build the full router: public routes, JWT-protected routes, tracing
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router with the CORS policy from config applied on top of [`app`]
pub fn app_with_config(state: AppState, config: &AppConfig) -> Router {
    let router = app(state);
    if !config.security.enable_cors {
        return router;
    }
    router.layer(cors_layer(&config.security.cors_origins))
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/api/registration", post(auth::register_post))
        .route("/api/login", post(auth::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected;

    Router::new()
        .route("/api/profile", get(protected::profile_get))
        .route(
            "/api/students",
            get(protected::students_get).post(protected::students_post),
        )
        .route(
            "/api/students/:id",
            get(protected::student_get)
                .put(protected::student_put)
                .delete(protected::student_delete),
        )
        .route_layer(from_fn_with_state(state, middleware::jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

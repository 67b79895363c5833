use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AuthError, PasswordHasher, TokenService};
use crate::database::models::{NewStudent, StudentChanges, StudentResponse};
use crate::database::{StoreError, StudentStore};
use crate::error::ApiError;
use crate::middleware::Session;
use crate::validation::{normalize_email, PasswordRule, StudentPayload};

/// Login request body
#[derive(Default, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Registration, login, profile lookup and student CRUD.
///
/// bcrypt work runs on the blocking pool so request tasks are not stalled.
#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn StudentStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
}

impl StudentService {
    pub fn new(store: Arc<dyn StudentStore>, hasher: PasswordHasher, tokens: Arc<TokenService>) -> Self {
        Self { store, hasher, tokens }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Register a new student and return its id
    pub async fn register(&self, payload: StudentPayload) -> Result<i64, ApiError> {
        let id = self.create(payload).await?;
        info!("User registered, id: {}", id);
        Ok(id)
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown email and wrong password fail the same way.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
        let email = normalize_email(&request.email);
        let password = request.password;

        let student = match self.store.find_by_email(&email).await {
            Ok(student) => Some(student),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let hasher = self.hasher.clone();
        let verified = match student {
            Some(student) => {
                let password_hash = student.password_hash.clone();
                let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash)).await??;
                matches.then_some(student)
            }
            None => {
                tokio::task::spawn_blocking(move || hasher.verify_dummy(&password)).await?;
                None
            }
        };

        let student = match verified {
            Some(student) => student,
            None => {
                warn!("Failed login attempt");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let token = self.tokens.issue(&student.email)?;
        info!("Student {} logged in", student.id);

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.ttl().num_seconds(),
        })
    }

    /// The record behind the verified session identity
    pub async fn profile(&self, session: &Session) -> Result<StudentResponse, ApiError> {
        let student = self.store.find_by_email(&session.email).await.map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("profile not found"),
            other => other.into(),
        })?;
        Ok(student.into())
    }

    pub async fn create(&self, payload: StudentPayload) -> Result<i64, ApiError> {
        let valid = payload.validate(PasswordRule::Required)?;
        let password = valid.password.ok_or(AuthError::EmptyCredential)?;
        let password_hash = self.hash(password).await?;

        let id = self
            .store
            .create(NewStudent {
                name: valid.name,
                email: valid.email,
                password_hash,
                age: valid.age,
            })
            .await?;

        Ok(id)
    }

    pub async fn list(&self) -> Result<Vec<StudentResponse>, ApiError> {
        let students = self.store.list().await?;
        Ok(students.into_iter().map(StudentResponse::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<StudentResponse, ApiError> {
        Ok(self.store.find_by_id(id).await?.into())
    }

    /// Replace a student's fields; the password is only changed when given
    pub async fn update(&self, id: i64, payload: StudentPayload) -> Result<StudentResponse, ApiError> {
        let valid = payload.validate(PasswordRule::Optional)?;
        let password_hash = match valid.password {
            Some(password) => Some(self.hash(password).await?),
            None => None,
        };

        self.store
            .update(
                id,
                StudentChanges {
                    name: valid.name,
                    email: valid.email,
                    password_hash,
                    age: valid.age,
                },
            )
            .await?;

        info!("Student {} updated", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.store.delete(id).await?;
        info!("Student {} deleted", id);
        Ok(())
    }

    /// Store connectivity for the health endpoint
    pub async fn health(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    async fn hash(&self, password: String) -> Result<String, ApiError> {
        let hasher = self.hasher.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
        Ok(password_hash)
    }
}

pub mod password;
pub mod token;

pub use password::PasswordHasher;
pub use token::{Claims, TokenService, TOKEN_TTL_HOURS};

use thiserror::Error;

/// Failures raised by credential hashing and token handling
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credential must not be empty")]
    EmptyCredential,

    #[error("Stored password hash is malformed")]
    MalformedHash,

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Missing bearer credential")]
    MissingCredential,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature does not verify")]
    InvalidSignature,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Signing secret must not be empty")]
    InvalidSecret,

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
}

impl AuthError {
    /// True for every failure the auth gate reports as "unauthorized"
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredential
                | AuthError::MalformedToken
                | AuthError::InvalidSignature
                | AuthError::ExpiredToken
        )
    }
}

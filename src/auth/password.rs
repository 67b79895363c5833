use bcrypt::{hash, verify};

use super::AuthError;

/// Plaintext used to build the hash behind [`PasswordHasher::verify_dummy`]
const DUMMY_PASSWORD: &str = "student-api-dummy-password";

/// bcrypt-backed password hashing with a configurable work factor
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: String,
}

impl PasswordHasher {
    /// Build a hasher for the given bcrypt cost (4..=31).
    ///
    /// Computes one hash up front so that logins for unknown accounts can
    /// burn the same amount of work as a real verification.
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        let dummy_hash = hash(DUMMY_PASSWORD, cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        if plaintext.is_empty() {
            return Err(AuthError::EmptyCredential);
        }
        Ok(hash(plaintext, self.cost)?)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only a structurally invalid hash is an error.
    pub fn verify(&self, plaintext: &str, password_hash: &str) -> Result<bool, AuthError> {
        verify(plaintext, password_hash).map_err(|e| {
            tracing::debug!("bcrypt rejected stored hash: {}", e);
            AuthError::MalformedHash
        })
    }

    /// Spend one verification worth of work and discard the result
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = verify(plaintext, &self.dummy_hash);
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").field("cost", &self.cost).finish_non_exhaustive()
    }
}

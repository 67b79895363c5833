use async_trait::async_trait;
use thiserror::Error;

use super::models::{NewStudent, Student, StudentChanges};

/// Errors surfaced by a [`StudentStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Student not found")]
    NotFound,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::DuplicateEmail,
            _ => StoreError::Sqlx(err),
        }
    }
}

/// Persistence for student records keyed by id, with a unique email column.
///
/// Implementations must enforce email uniqueness atomically in the
/// database and report violations as [`StoreError::DuplicateEmail`].
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn create(&self, student: NewStudent) -> Result<i64, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Student, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Student, StoreError>;

    async fn list(&self) -> Result<Vec<Student>, StoreError>;

    async fn update(&self, id: i64, changes: StudentChanges) -> Result<(), StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Cheap connectivity probe for health checks
    async fn ping(&self) -> Result<(), StoreError>;
}

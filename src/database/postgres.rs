use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{NewStudent, Student, StudentChanges};
use super::store::{StoreError, StudentStore};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id       BIGSERIAL PRIMARY KEY,
        name     TEXT    NOT NULL,
        email    TEXT    NOT NULL UNIQUE,
        password TEXT    NOT NULL,
        age      INTEGER NOT NULL
    )
"#;

/// PostgreSQL-backed student store
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn new(pool: PgPool) -> Result<Self, sqlx::Error> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl StudentStore for PostgresStore {
    async fn create(&self, student: NewStudent) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO students (name, email, password, age) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.password_hash)
        .bind(student.age)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Student, StoreError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, name, email, password, age FROM students WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(student)
    }

    async fn find_by_email(&self, email: &str) -> Result<Student, StoreError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, name, email, password, age FROM students WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(student)
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT id, name, email, password, age FROM students ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    async fn update(&self, id: i64, changes: StudentChanges) -> Result<(), StoreError> {
        // COALESCE keeps the stored hash when no new password was given
        let result = sqlx::query(
            "UPDATE students
             SET name = $1, email = $2, password = COALESCE($3, password), age = $4
             WHERE id = $5",
        )
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(changes.password_hash.as_deref())
        .bind(changes.age)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

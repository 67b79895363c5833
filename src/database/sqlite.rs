use async_trait::async_trait;
use sqlx::SqlitePool;

use super::models::{NewStudent, Student, StudentChanges};
use super::store::{StoreError, StudentStore};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT    NOT NULL,
        email    TEXT    NOT NULL UNIQUE,
        password TEXT    NOT NULL,
        age      INTEGER NOT NULL
    )
"#;

/// SQLite-backed student store
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap a pool and make sure the `students` table exists
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl StudentStore for SqliteStore {
    async fn create(&self, student: NewStudent) -> Result<i64, StoreError> {
        let result = sqlx::query("INSERT INTO students (name, email, password, age) VALUES (?, ?, ?, ?)")
            .bind(&student.name)
            .bind(&student.email)
            .bind(&student.password_hash)
            .bind(student.age)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn find_by_id(&self, id: i64) -> Result<Student, StoreError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, name, email, password, age FROM students WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(student)
    }

    async fn find_by_email(&self, email: &str) -> Result<Student, StoreError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, name, email, password, age FROM students WHERE email = ?",
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
        let result = match &changes.password_hash {
            Some(password_hash) => {
                sqlx::query("UPDATE students SET name = ?, email = ?, password = ?, age = ? WHERE id = ?")
                    .bind(&changes.name)
                    .bind(&changes.email)
                    .bind(password_hash)
                    .bind(changes.age)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("UPDATE students SET name = ?, email = ?, age = ? WHERE id = ?")
                    .bind(&changes.name)
                    .bind(&changes.email)
                    .bind(changes.age)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_pool;

    fn new_student(email: &str) -> NewStudent {
        NewStudent {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            age: 20,
        }
    }

    async fn store() -> SqliteStore {
        SqliteStore::new(memory_pool().await).await.unwrap()
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = store().await;
        let id = store.create(new_student("a@x.com")).await.unwrap();

        let by_id = store.find_by_id(id).await.unwrap();
        assert_eq!(by_id.email, "a@x.com");
        assert_eq!(by_id.password_hash, "$2b$04$hash");

        let by_email = store.find_by_email("a@x.com").await.unwrap();
        assert_eq!(by_email.id, id);
    }

    #[tokio::test]
    async fn duplicate_email_is_reported() {
        let store = store().await;
        store.create(new_student("a@x.com")).await.unwrap();
        let err = store.create(new_student("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail), "unexpected: {:?}", err);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = store().await;
        assert!(matches!(store.find_by_id(42).await, Err(StoreError::NotFound)));
        assert!(matches!(store.find_by_email("nobody@x.com").await, Err(StoreError::NotFound)));
        assert!(matches!(store.delete(42).await, Err(StoreError::NotFound)));

        let changes = StudentChanges {
            name: "Ada".into(),
            email: "a@x.com".into(),
            password_hash: None,
            age: 21,
        };
        assert!(matches!(store.update(42, changes).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn update_keeps_hash_unless_replaced() {
        let store = store().await;
        let id = store.create(new_student("a@x.com")).await.unwrap();

        let changes = StudentChanges {
            name: "Ada L".into(),
            email: "ada@x.com".into(),
            password_hash: None,
            age: 21,
        };
        store.update(id, changes).await.unwrap();
        let updated = store.find_by_id(id).await.unwrap();
        assert_eq!(updated.name, "Ada L");
        assert_eq!(updated.email, "ada@x.com");
        assert_eq!(updated.password_hash, "$2b$04$hash");

        let changes = StudentChanges {
            name: "Ada L".into(),
            email: "ada@x.com".into(),
            password_hash: Some("$2b$04$other".into()),
            age: 21,
        };
        store.update(id, changes).await.unwrap();
        assert_eq!(store.find_by_id(id).await.unwrap().password_hash, "$2b$04$other");
    }

    #[tokio::test]
    async fn list_and_delete() {
        let store = store().await;
        let first = store.create(new_student("a@x.com")).await.unwrap();
        store.create(new_student("b@x.com")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);

        store.delete(first).await.unwrap();
        let remaining = store.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].email, "b@x.com");
        store.ping().await.unwrap();
    }
}

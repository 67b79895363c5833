use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `students` table, including the stored password hash
#[derive(Clone, PartialEq, Eq, FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub age: i32,
}

impl std::fmt::Debug for Student {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Student")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("age", &self.age)
            .finish()
    }
}

/// Public projection of a student; never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            name: student.name,
            email: student.email,
            age: student.age,
        }
    }
}

/// Insert parameters; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
}

/// Update parameters; `password_hash: None` keeps the stored hash
#[derive(Debug, Clone)]
pub struct StudentChanges {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub age: i32,
}

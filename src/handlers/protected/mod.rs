// handlers/protected/mod.rs - handlers behind jwt_auth_middleware
//
// Each handler may rely on an `Extension<Session>` being present.
pub mod profile;
pub mod students;

pub use profile::profile_get;
pub use students::{student_delete, student_get, student_put, students_get, students_post};

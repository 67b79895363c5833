pub mod manager;
pub mod models;
pub mod postgres;
pub mod sqlite;
pub mod store;

pub use manager::{Backend, DatabaseError, DatabaseManager};
pub use store::{StoreError, StudentStore};

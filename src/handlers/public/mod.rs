// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and liveness endpoints. Inputs here come from anonymous
// callers and are validated before anything touches the store.
pub mod auth;
pub mod health;

pub use health::{health, root};

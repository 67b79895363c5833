// handlers/mod.rs - two security tiers
//
// Public (no auth): /, /health, /api/registration, /api/login
// Protected (JWT auth): /api/profile, /api/students[/:id]
pub mod protected;
pub mod public;

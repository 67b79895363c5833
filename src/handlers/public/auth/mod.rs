// handlers/public/auth/mod.rs - account creation and token acquisition
pub mod login; // POST /api/login - check credentials and get a JWT
pub mod register; // POST /api/registration - create a new account

pub use login::login_post;
pub use register::register_post;

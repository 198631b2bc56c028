// Request guards and shared state

pub mod auth;
pub mod state;

pub use auth::{AdminUser, AuthUser};
pub use state::AppState;

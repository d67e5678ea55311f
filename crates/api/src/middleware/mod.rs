//! Middleware and request extractors.

pub mod auth;
pub mod cookies;
pub mod request_id;

pub use auth::{CurrentUser, RequireManager};
pub use cookies::{append_auth_cookies, append_cleared_cookies};
pub use request_id::request_id_middleware;

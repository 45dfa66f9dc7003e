//! API middleware.

mod auth;
mod bootstrap;
mod rate_limit;

pub use auth::{auth_middleware, enforce, require_admin, require_role};
pub use bootstrap::bootstrap_middleware;
pub use rate_limit::rate_limit_auth_middleware;

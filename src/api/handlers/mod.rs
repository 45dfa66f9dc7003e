//! HTTP request handlers.

pub mod admin_handler;
pub mod report_handler;
pub mod superuser_handler;
pub mod user_handler;

pub use admin_handler::admin_routes;
pub use superuser_handler::{bootstrap_routes, profile_routes, status_routes};
pub use user_handler::{account_routes, user_routes};

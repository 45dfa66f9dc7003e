//! Storefront API - accounts, authorization, first-run bootstrap and reporting
//!
//! Regular users register and sign in; a single superuser is created on
//! first run and every other route stays closed until it exists. Admins
//! manage users and read sales reports aggregated from orders.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Identities, roles, access decisions and report aggregation
//! - **services**: Authentication, bootstrap gate, user and report use cases
//! - **infra**: Database, repositories and the Redis rate limiter
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Create the superuser without going through HTTP
//! SUPERUSER_PASSWORD=... cargo run -- superuser create --name Owner --email owner@example.com
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, Role, User};
pub use errors::{AppError, AppResult};

//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `superuser` - Check for or create the superuser

pub mod args;

pub use args::{Cli, Commands};

//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Redis-backed rate limiting
//! - Unit of Work for repository access

pub mod db;
pub mod rate_limiter;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use rate_limiter::RateLimiter;
pub use repositories::{
    CatalogRepository, CatalogStore, SuperUserRepository, SuperUserStore, UserRepository,
    UserStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(test)]
pub use repositories::{MockCatalogRepository, MockSuperUserRepository, MockUserRepository};

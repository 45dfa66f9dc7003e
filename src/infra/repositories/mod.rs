//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod catalog_repository;
pub(crate) mod entities;
mod superuser_repository;
mod user_repository;

pub use catalog_repository::{CatalogRepository, CatalogStore};
pub use superuser_repository::{SuperUserRepository, SuperUserStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
#[cfg(test)]
pub use superuser_repository::MockSuperUserRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories so services depend on one handle
//! instead of a growing list of repository parameters. Multi-statement
//! atomicity lives inside the repository that needs it (see
//! `SuperUserRepository::create_first`).

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    CatalogRepository, CatalogStore, SuperUserRepository, SuperUserStore, UserRepository,
    UserStore,
};

/// Unit of Work trait for dependency injection.
///
/// Tests supply their own implementation backed by mocks or in-memory stores.
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get superuser repository
    fn superusers(&self) -> Arc<dyn SuperUserRepository>;

    /// Get read-only product/order repository
    fn catalog(&self) -> Arc<dyn CatalogRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    superuser_repo: Arc<SuperUserStore>,
    catalog_repo: Arc<CatalogStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            superuser_repo: Arc::new(SuperUserStore::new(db.clone())),
            catalog_repo: Arc::new(CatalogStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn superusers(&self) -> Arc<dyn SuperUserRepository> {
        self.superuser_repo.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.catalog_repo.clone()
    }
}

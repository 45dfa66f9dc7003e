//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use the Unit of Work for centralized repository access.

mod auth_service;
pub mod bootstrap;
pub mod container;
mod report_service;
mod superuser_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AuthService, Authenticator, Claims, SessionResponse, SuperUserSignup, TokenResponse,
};
pub use bootstrap::{BootstrapGate, BootstrapState, GatedOperation, SetupGate};
pub use report_service::{ReportManager, ReportService};
pub use superuser_service::{SuperUserManager, SuperUserService, SuperUserUpdate};
pub use user_service::{AdminNewUser, UserManager, UserService, UserUpdate};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::infra::{
        CatalogRepository, MockCatalogRepository, MockSuperUserRepository, MockUserRepository,
        SuperUserRepository, UnitOfWork, UserRepository,
    };

    /// Unit of Work over mockall repositories
    pub struct MockUow {
        users: Arc<MockUserRepository>,
        superusers: Arc<MockSuperUserRepository>,
        catalog: Arc<MockCatalogRepository>,
    }

    impl MockUow {
        pub fn new(users: MockUserRepository, superusers: MockSuperUserRepository) -> Self {
            Self {
                users: Arc::new(users),
                superusers: Arc::new(superusers),
                catalog: Arc::new(MockCatalogRepository::new()),
            }
        }

        pub fn with_catalog(mut self, catalog: MockCatalogRepository) -> Self {
            self.catalog = Arc::new(catalog);
            self
        }
    }

    impl UnitOfWork for MockUow {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.users.clone()
        }

        fn superusers(&self) -> Arc<dyn SuperUserRepository> {
            self.superusers.clone()
        }

        fn catalog(&self) -> Arc<dyn CatalogRepository> {
            self.catalog.clone()
        }
    }
}

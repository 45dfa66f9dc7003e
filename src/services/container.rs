//! Service Container - Centralized service access.
//!
//! SOLID (SRP): Manages service lifecycle and access.
//! SOLID (DIP): Depends on service traits, not implementations.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, BootstrapGate, ReportManager, ReportService, SetupGate,
    SuperUserManager, SuperUserService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{Persistence, UnitOfWork};

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get superuser service
    fn superusers(&self) -> Arc<dyn SuperUserService>;

    /// Get report service
    fn reports(&self) -> Arc<dyn ReportService>;

    /// Get bootstrap gate
    fn gate(&self) -> Arc<dyn SetupGate>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    superuser_service: Arc<dyn SuperUserService>,
    report_service: Arc<dyn ReportService>,
    setup_gate: Arc<dyn SetupGate>,
}

impl Services {
    /// Wire every service over one Unit of Work
    pub fn from_unit_of_work<U: UnitOfWork + 'static>(uow: Arc<U>, config: Config) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            superuser_service: Arc::new(SuperUserManager::new(uow.clone())),
            report_service: Arc::new(ReportManager::new(uow.clone())),
            setup_gate: Arc::new(BootstrapGate::new(uow)),
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        Self::from_unit_of_work(Arc::new(Persistence::new(db)), config)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn superusers(&self) -> Arc<dyn SuperUserService> {
        self.superuser_service.clone()
    }

    fn reports(&self) -> Arc<dyn ReportService> {
        self.report_service.clone()
    }

    fn gate(&self) -> Arc<dyn SetupGate> {
        self.setup_gate.clone()
    }
}

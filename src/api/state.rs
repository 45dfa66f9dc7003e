//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use chrono::FixedOffset;
use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, RateLimiter};
use crate::services::{
    AuthService, ReportService, ServiceContainer, Services, SetupGate, SuperUserService,
    UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Superuser status and profile
    pub superuser_service: Arc<dyn SuperUserService>,
    /// Dashboard and reports
    pub report_service: Arc<dyn ReportService>,
    /// Bootstrap gate consulted on every request
    pub setup_gate: Arc<dyn SetupGate>,
    /// Redis rate limiter, `None` when Redis is not configured
    pub rate_limiter: Option<Arc<RateLimiter>>,
    /// Database connection
    pub database: Arc<Database>,
    /// Offset for bucketing sales by calendar day
    pub report_utc_offset: FixedOffset,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(
        database: Arc<Database>,
        rate_limiter: Option<Arc<RateLimiter>>,
        config: Config,
    ) -> Self {
        let report_utc_offset = config.report_utc_offset;
        let container = Services::from_connection(database.get_connection(), config);

        Self::from_services(&container, database, rate_limiter, report_utc_offset)
    }

    /// Create application state from an already wired service container.
    pub fn from_services(
        services: &impl ServiceContainer,
        database: Arc<Database>,
        rate_limiter: Option<Arc<RateLimiter>>,
        report_utc_offset: FixedOffset,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            superuser_service: services.superusers(),
            report_service: services.reports(),
            setup_gate: services.gate(),
            rate_limiter,
            database,
            report_utc_offset,
        }
    }
}

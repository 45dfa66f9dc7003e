//! Bootstrap gate.
//!
//! Until a superuser exists the API only serves the superuser check, creation
//! and signin routes (plus health and docs). Every request starts from
//! `Uninitialized` and resolves against the store; nothing is cached.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BootstrapState {
    /// Not yet resolved against the store
    #[default]
    Uninitialized,
    /// No active superuser
    AwaitingSetup,
    Ready,
}

/// What a request is trying to do, as far as the gate cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedOperation {
    CheckSuperUser,
    CreateSuperUser,
    SignIn,
    /// Health probes and API docs
    Exempt,
    Other,
}

impl GatedOperation {
    pub fn classify(path: &str) -> Self {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/superuser/check" => GatedOperation::CheckSuperUser,
            "/superuser/create" => GatedOperation::CreateSuperUser,
            "/users/signin" | "/superuser/signin" => GatedOperation::SignIn,
            "/" | "/health" => GatedOperation::Exempt,
            p if p.starts_with("/swagger-ui") || p.starts_with("/api-docs") => {
                GatedOperation::Exempt
            }
            _ => GatedOperation::Other,
        }
    }
}

impl BootstrapState {
    /// Resolve from the number of active superusers. Only `Uninitialized`
    /// moves; a resolved state changes through `after_superuser_created`.
    pub fn resolve(self, active_superusers: u64) -> Self {
        match self {
            BootstrapState::Uninitialized if active_superusers == 0 => {
                BootstrapState::AwaitingSetup
            }
            BootstrapState::Uninitialized => BootstrapState::Ready,
            resolved => resolved,
        }
    }

    pub fn permits(&self, operation: GatedOperation) -> bool {
        self.check(operation).is_ok()
    }

    /// Decide whether `operation` may proceed in this state.
    pub fn check(&self, operation: GatedOperation) -> AppResult<()> {
        use GatedOperation::*;

        match (self, operation) {
            (_, Exempt) => Ok(()),
            (BootstrapState::AwaitingSetup, CheckSuperUser | CreateSuperUser | SignIn) => Ok(()),
            (BootstrapState::Ready, CreateSuperUser) => Err(AppError::SuperUserExists),
            (BootstrapState::Ready, _) => Ok(()),
            (BootstrapState::AwaitingSetup | BootstrapState::Uninitialized, _) => {
                Err(AppError::SetupRequired)
            }
        }
    }

    /// Transition after a superuser was created.
    pub fn after_superuser_created(self) -> Self {
        BootstrapState::Ready
    }
}

/// Gate consulted by the HTTP middleware.
#[async_trait]
pub trait SetupGate: Send + Sync {
    /// Current state, derived from the store
    async fn state(&self) -> AppResult<BootstrapState>;

    /// Resolve the state and check the request path against it.
    ///
    /// Superuser creation always reaches its handler: the body is validated
    /// there first, then the authenticator applies the same state check.
    async fn check(&self, path: &str) -> AppResult<()> {
        let operation = GatedOperation::classify(path);
        if matches!(operation, GatedOperation::Exempt | GatedOperation::CreateSuperUser) {
            return Ok(());
        }

        let state = self.state().await?;
        state.check(operation).map_err(|e| {
            tracing::warn!(path = %path, state = ?state, error = %e, "Request blocked by bootstrap gate");
            e
        })
    }
}

pub struct BootstrapGate<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> BootstrapGate<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> SetupGate for BootstrapGate<U> {
    async fn state(&self) -> AppResult<BootstrapState> {
        let count = self.uow.superusers().count_active().await?;
        Ok(BootstrapState::default().resolve(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockSuperUserRepository, MockUserRepository};
    use crate::services::test_support::MockUow;

    #[test]
    fn test_resolve() {
        assert_eq!(BootstrapState::default(), BootstrapState::Uninitialized);
        assert_eq!(BootstrapState::default().resolve(0), BootstrapState::AwaitingSetup);
        assert_eq!(BootstrapState::default().resolve(1), BootstrapState::Ready);
    }

    #[test]
    fn test_resolved_state_only_moves_on_creation() {
        let awaiting = BootstrapState::default().resolve(0);
        assert_eq!(awaiting.resolve(1), BootstrapState::AwaitingSetup);
        assert_eq!(awaiting.after_superuser_created(), BootstrapState::Ready);
        assert_eq!(BootstrapState::Ready.resolve(0), BootstrapState::Ready);
    }

    #[test]
    fn test_classify_paths() {
        assert_eq!(GatedOperation::classify("/superuser/check"), GatedOperation::CheckSuperUser);
        assert_eq!(GatedOperation::classify("/superuser/create/"), GatedOperation::CreateSuperUser);
        assert_eq!(GatedOperation::classify("/users/signin"), GatedOperation::SignIn);
        assert_eq!(GatedOperation::classify("/superuser/signin"), GatedOperation::SignIn);
        assert_eq!(GatedOperation::classify("/health"), GatedOperation::Exempt);
        assert_eq!(GatedOperation::classify("/"), GatedOperation::Exempt);
        assert_eq!(GatedOperation::classify("/swagger-ui/index.html"), GatedOperation::Exempt);
        assert_eq!(GatedOperation::classify("/api-docs/openapi.json"), GatedOperation::Exempt);
        assert_eq!(GatedOperation::classify("/users/register"), GatedOperation::Other);
        assert_eq!(GatedOperation::classify("/admin/stats"), GatedOperation::Other);
    }

    #[test]
    fn test_awaiting_setup_allows_only_bootstrap_routes() {
        let state = BootstrapState::AwaitingSetup;
        assert!(state.permits(GatedOperation::CheckSuperUser));
        assert!(state.permits(GatedOperation::CreateSuperUser));
        assert!(state.permits(GatedOperation::SignIn));
        assert!(state.permits(GatedOperation::Exempt));
        assert!(matches!(
            state.check(GatedOperation::Other),
            Err(AppError::SetupRequired)
        ));
    }

    #[test]
    fn test_ready_rejects_second_superuser() {
        let state = BootstrapState::AwaitingSetup.after_superuser_created();
        assert_eq!(state, BootstrapState::Ready);
        assert!(state.permits(GatedOperation::Other));
        assert!(matches!(
            state.check(GatedOperation::CreateSuperUser),
            Err(AppError::SuperUserExists)
        ));
    }

    #[test]
    fn test_uninitialized_allows_only_exempt() {
        let state = BootstrapState::Uninitialized;
        assert!(state.permits(GatedOperation::Exempt));
        assert!(!state.permits(GatedOperation::SignIn));
    }

    #[tokio::test]
    async fn test_gate_rederives_state_each_call() {
        let mut superusers = MockSuperUserRepository::new();
        let mut seq = mockall::Sequence::new();
        superusers
            .expect_count_active()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(0));
        superusers
            .expect_count_active()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(1));

        let gate = BootstrapGate::new(Arc::new(MockUow::new(MockUserRepository::new(), superusers)));

        assert!(matches!(gate.check("/admin/stats").await, Err(AppError::SetupRequired)));
        assert!(gate.check("/admin/stats").await.is_ok());
    }

    #[tokio::test]
    async fn test_exempt_paths_skip_the_store() {
        let mut superusers = MockSuperUserRepository::new();
        superusers.expect_count_active().never();

        let gate = BootstrapGate::new(Arc::new(MockUow::new(MockUserRepository::new(), superusers)));
        assert!(gate.check("/health").await.is_ok());
    }

    #[tokio::test]
    async fn test_creation_deferred_to_authenticator() {
        let mut superusers = MockSuperUserRepository::new();
        superusers.expect_count_active().never();

        let gate = BootstrapGate::new(Arc::new(MockUow::new(MockUserRepository::new(), superusers)));
        assert!(gate.check("/superuser/create").await.is_ok());
    }
}

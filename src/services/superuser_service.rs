//! Superuser service - bootstrap status and profile management.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    normalize_email, HashPolicy, Password, SuperUserChanges, SuperUserProfile, SuperUserStatus,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Requested profile changes. Blank strings count as "not provided".
#[derive(Debug, Clone, Default)]
pub struct SuperUserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[async_trait]
pub trait SuperUserService: Send + Sync {
    /// Whether an active superuser exists
    async fn status(&self) -> AppResult<SuperUserStatus>;

    async fn profile(&self, id: Uuid) -> AppResult<SuperUserProfile>;

    async fn update_profile(&self, id: Uuid, update: SuperUserUpdate) -> AppResult<SuperUserProfile>;
}

pub struct SuperUserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> SuperUserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> SuperUserService for SuperUserManager<U> {
    async fn status(&self) -> AppResult<SuperUserStatus> {
        let count = self.uow.superusers().count_active().await?;
        Ok(SuperUserStatus::from_count(count))
    }

    async fn profile(&self, id: Uuid) -> AppResult<SuperUserProfile> {
        self.uow
            .superusers()
            .find_by_id(id)
            .await?
            .filter(|s| s.is_active)
            .map(SuperUserProfile::from)
            .ok_or(AppError::NotFound)
    }

    async fn update_profile(&self, id: Uuid, update: SuperUserUpdate) -> AppResult<SuperUserProfile> {
        // Existence first so a bad id is a 404, not a validation error
        self.profile(id).await?;

        let password_hash = match update.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(
                Password::hash_blocking(password, HashPolicy::Elevated)
                    .await?
                    .into_string(),
            ),
            None => None,
        };

        let changes = SuperUserChanges {
            name: update
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            email: update
                .email
                .map(|e| normalize_email(&e))
                .filter(|e| !e.is_empty()),
            password_hash,
        };

        let superuser = self.uow.superusers().update(id, changes).await?;
        tracing::info!(user_id = %superuser.id, "Superuser profile updated");
        Ok(SuperUserProfile::from(superuser))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, SuperUser};
    use crate::infra::{MockSuperUserRepository, MockUserRepository};
    use crate::services::test_support::MockUow;
    use chrono::Utc;

    fn root(id: Uuid, active: bool) -> SuperUser {
        SuperUser {
            id,
            name: "Root".into(),
            email: "root@example.com".into(),
            password_hash: "hashed".into(),
            is_active: active,
            created_by: "system".into(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn manager(superusers: MockSuperUserRepository) -> SuperUserManager<MockUow> {
        SuperUserManager::new(Arc::new(MockUow::new(MockUserRepository::new(), superusers)))
    }

    #[tokio::test]
    async fn test_status_reports_count() {
        let mut superusers = MockSuperUserRepository::new();
        superusers.expect_count_active().returning(|| Ok(1));

        let status = manager(superusers).status().await.unwrap();
        assert!(status.exists);
        assert_eq!(status.count, 1);
    }

    #[tokio::test]
    async fn test_profile_hides_inactive_record() {
        let mut superusers = MockSuperUserRepository::new();
        superusers
            .expect_find_by_id()
            .returning(|id| Ok(Some(root(id, false))));

        let result = manager(superusers).profile(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_profile_normalizes_email() {
        let mut superusers = MockSuperUserRepository::new();
        superusers
            .expect_find_by_id()
            .returning(|id| Ok(Some(root(id, true))));
        superusers
            .expect_update()
            .withf(|_, changes| {
                changes.email.as_deref() == Some("new@example.com")
                    && changes.name.is_none()
                    && changes.password_hash.is_none()
            })
            .returning(|id, changes| {
                let mut s = root(id, true);
                s.email = changes.email.unwrap_or(s.email);
                Ok(s)
            });

        let profile = manager(superusers)
            .update_profile(
                Uuid::new_v4(),
                SuperUserUpdate {
                    name: Some("   ".into()),
                    email: Some(" New@Example.com".into()),
                    password: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.email, "new@example.com");
        assert_eq!(profile.role, Role::SuperUser);
    }
}

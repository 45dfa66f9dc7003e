//! User service - Handles user-related business logic.
//!
//! Covers self-service profile edits and the admin user management screen.
//! Authorization happens before these calls; this layer enforces data rules
//! (unique emails, password policy, existence).

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{normalize_email, HashPolicy, NewUser, Password, User, UserChanges};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Requested changes to a user. Blank strings count as "not provided".
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// Input for an admin-created user
#[derive(Debug, Clone)]
pub struct AdminNewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Create a user on behalf of an admin
    async fn create_user(&self, input: AdminNewUser) -> AppResult<User>;

    /// Apply changes to a user
    async fn update_user(&self, id: Uuid, update: UserUpdate) -> AppResult<User>;

    /// Flip the admin flag
    async fn toggle_admin(&self, id: Uuid) -> AppResult<User>;

    /// Permanently delete a user
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Reject an email already held by a different user.
    async fn ensure_email_free(&self, email: &str, owner: Option<Uuid>) -> AppResult<()> {
        match self.uow.users().find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::conflict("User")),
            _ => Ok(()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }

    async fn create_user(&self, input: AdminNewUser) -> AppResult<User> {
        let name = non_blank(Some(input.name))
            .ok_or_else(|| AppError::validation("Name is required"))?;
        let email = non_blank(Some(input.email))
            .map(|e| normalize_email(&e))
            .ok_or_else(|| AppError::validation("Email is required"))?;

        self.ensure_email_free(&email, None).await?;

        let password_hash = Password::hash_blocking(input.password, HashPolicy::Standard)
            .await?
            .into_string();

        let user = self
            .uow
            .users()
            .create(NewUser {
                name,
                email,
                password_hash,
                is_admin: input.is_admin,
            })
            .await?;

        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User created by admin");
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> AppResult<User> {
        // 404 before any other checks
        self.get_user(id).await?;

        let email = non_blank(update.email).map(|e| normalize_email(&e));
        if let Some(email) = &email {
            self.ensure_email_free(email, Some(id)).await?;
        }

        let password_hash = match update.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(
                Password::hash_blocking(password, HashPolicy::Standard)
                    .await?
                    .into_string(),
            ),
            None => None,
        };

        let user = self
            .uow
            .users()
            .update(
                id,
                UserChanges {
                    name: non_blank(update.name),
                    email,
                    password_hash,
                    is_admin: update.is_admin,
                },
            )
            .await?;

        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    async fn toggle_admin(&self, id: Uuid) -> AppResult<User> {
        let user = self.get_user(id).await?;
        let changes = UserChanges {
            is_admin: Some(!user.is_admin),
            ..UserChanges::default()
        };

        let user = self.uow.users().update(id, changes).await?;
        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "Admin flag toggled");
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.uow.users().delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

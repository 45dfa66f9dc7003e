//! Superuser repository implementation.
//!
//! The single-active-superuser invariant is enforced twice: a serializable
//! check-and-insert in [`SuperUserRepository::create_first`] and a partial
//! unique index on `superusers(is_active)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, RuntimeErr, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::entities::superuser::{self, ActiveModel, Entity as SuperUserEntity};
use crate::domain::{NewSuperUser, SuperUser, SuperUserChanges};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

const SINGLE_ACTIVE_INDEX: &str = "idx_superusers_single_active";
const SERIALIZATION_FAILURE: &str = "40001";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SuperUserRepository: Send + Sync {
    /// Number of active superusers (0 or 1)
    async fn count_active(&self) -> AppResult<u64>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SuperUser>>;

    /// Find the active superuser with this (normalized) email
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<SuperUser>>;

    /// Fetch every superuser whose id is in `ids`
    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<SuperUser>>;

    /// Insert the first active superuser.
    ///
    /// Fails with `SuperUserExists` if an active one is already present and with
    /// `Conflict` if the email belongs to another superuser record.
    async fn create_first(&self, superuser: NewSuperUser) -> AppResult<SuperUser>;

    /// Stamp the last successful signin
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Apply a partial profile update
    async fn update(&self, id: Uuid, changes: SuperUserChanges) -> AppResult<SuperUser>;
}

pub struct SuperUserStore {
    db: DatabaseConnection,
}

impl SuperUserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn is_serialization_failure(err: &DbErr) -> bool {
    match err {
        DbErr::Conn(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(e)))
        | DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(e)))
        | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(e))) => {
            e.code().as_deref() == Some(SERIALIZATION_FAILURE)
        }
        _ => false,
    }
}

/// Translate insert failures into the bootstrap conflicts.
fn insert_error(err: DbErr) -> AppError {
    if is_serialization_failure(&err) {
        return AppError::SuperUserExists;
    }
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains(SINGLE_ACTIVE_INDEX) => {
            AppError::SuperUserExists
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::conflict("Superuser email")
        }
        _ => AppError::from(err),
    }
}

#[async_trait]
impl SuperUserRepository for SuperUserStore {
    async fn count_active(&self) -> AppResult<u64> {
        SuperUserEntity::find()
            .filter(superuser::Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SuperUser>> {
        let result = SuperUserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(SuperUser::from))
    }

    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<SuperUser>> {
        let result = SuperUserEntity::find()
            .filter(superuser::Column::Email.eq(email))
            .filter(superuser::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(SuperUser::from))
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<SuperUser>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = SuperUserEntity::find()
            .filter(superuser::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(SuperUser::from).collect())
    }

    async fn create_first(&self, new_superuser: NewSuperUser) -> AppResult<SuperUser> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let active = SuperUserEntity::find()
            .filter(superuser::Column::IsActive.eq(true))
            .count(&txn)
            .await
            .map_err(insert_error)?;
        if active > 0 {
            return Err(AppError::SuperUserExists);
        }

        let email_taken = SuperUserEntity::find()
            .filter(superuser::Column::Email.eq(new_superuser.email.as_str()))
            .count(&txn)
            .await
            .map_err(insert_error)?;
        if email_taken > 0 {
            return Err(AppError::conflict("Superuser email"));
        }

        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_superuser.name),
            email: Set(new_superuser.email),
            password_hash: Set(new_superuser.password_hash),
            is_active: Set(true),
            created_by: Set(new_superuser.created_by),
            last_login: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&txn).await.map_err(insert_error)?;
        txn.commit().await.map_err(insert_error)?;

        Ok(SuperUser::from(model))
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let model = SuperUserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = model.into();
        active.last_login = Set(Some(at));
        active.update(&self.db).await.map_err(AppError::from)?;

        Ok(())
    }

    async fn update(&self, id: Uuid, changes: SuperUserChanges) -> AppResult<SuperUser> {
        let model = SuperUserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = model.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(insert_error)?;
        Ok(SuperUser::from(model))
    }
}

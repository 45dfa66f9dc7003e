//! Superuser identity.
//!
//! Superusers live in their own table, disjoint from regular users. At most one
//! record may be active at a time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Role;

#[derive(Debug, Clone)]
pub struct SuperUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_by: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SuperUser {
    /// The role tag is fixed for this identity class.
    pub fn role(&self) -> Role {
        Role::SuperUser
    }
}

/// Values for the bootstrap insert. The password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSuperUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuperUserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Result of the bootstrap existence check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SuperUserStatus {
    pub exists: bool,
    pub count: u64,
}

impl SuperUserStatus {
    pub fn from_count(count: u64) -> Self {
        Self {
            exists: count > 0,
            count,
        }
    }
}

/// Superuser profile (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuperUserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<SuperUser> for SuperUserProfile {
    fn from(superuser: SuperUser) -> Self {
        Self {
            role: superuser.role(),
            id: superuser.id,
            name: superuser.name,
            email: superuser.email,
            last_login: superuser.last_login,
            created_at: superuser.created_at,
        }
    }
}

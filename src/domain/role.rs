//! Identity roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{ROLE_ADMIN, ROLE_SUPERUSER, ROLE_USER};
use crate::errors::AppError;

/// Role carried in a session token.
///
/// Variants are declared in privilege order so the derived `Ord` gives
/// `User < Admin < SuperUser`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    #[serde(rename = "superuser")]
    SuperUser,
}

impl Role {
    /// Role of a regular user record given its admin flag
    pub fn for_user(is_admin: bool) -> Self {
        if is_admin {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Check if this role grants admin privileges (superuser implies admin)
    pub fn is_admin(&self) -> bool {
        *self >= Role::Admin
    }

    /// Check if this role can access an operation requiring `required`
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Admin => ROLE_ADMIN,
            Role::SuperUser => ROLE_SUPERUSER,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(Role::User),
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_SUPERUSER => Ok(Role::SuperUser),
            other => Err(AppError::validation(format!("Unknown role '{}'", other))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

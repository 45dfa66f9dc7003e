//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Role;

/// Trim and lowercase an email address. Every lookup and write goes through this.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Regular user (customer or admin-flagged user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Role resolved from the admin flag
    pub fn role(&self) -> Role {
        Role::for_user(self.is_admin)
    }
}

/// Values for inserting a user. The password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Partial update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Display name
    #[schema(example = "Jane Doe")]
    pub name: String,
    /// Lowercased email address
    #[schema(example = "jane@example.com")]
    pub email: String,
    /// Admin flag
    pub is_admin: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn test_role_from_admin_flag() {
        let mut user = User {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            email: "jane@example.com".into(),
            password_hash: "hashed".into(),
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(user.role(), Role::User);

        user.is_admin = true;
        assert_eq!(user.role(), Role::Admin);
    }

    #[test]
    fn test_response_hides_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            email: "jane@example.com".into(),
            password_hash: "secret-hash".into(),
            is_admin: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&UserResponse::from(user.clone())).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"isAdmin\":true"));

        let raw = serde_json::to_string(&user).unwrap();
        assert!(!raw.contains("secret-hash"));
    }
}

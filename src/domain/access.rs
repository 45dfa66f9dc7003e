//! Authorization decisions.
//!
//! Pure functions over the principal decoded from a session token. `None`
//! stands for a missing, malformed or expired token. Nothing here touches the
//! store or logs; callers turn a [`Decision`] into an [`AppError`] with
//! [`Decision::into_result`].

use uuid::Uuid;

use super::Role;
use crate::errors::{AppError, AppResult};

/// Identity asserted by a verified session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => Err(AppError::Unauthorized),
            Decision::Deny(DenyReason::Forbidden) => Err(AppError::Forbidden),
        }
    }
}

/// Require at least `required` privilege.
pub fn authorize(principal: Option<&Principal>, required: Role) -> Decision {
    match principal {
        None => Decision::Deny(DenyReason::Unauthenticated),
        Some(p) if p.role.satisfies(required) => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::Forbidden),
    }
}

/// Deleting a user requires admin, and nobody may delete their own account.
pub fn authorize_user_deletion(principal: Option<&Principal>, target: Uuid) -> Decision {
    match principal {
        Some(p) if p.id == target => Decision::Deny(DenyReason::Forbidden),
        _ => authorize(principal, Role::Admin),
    }
}

/// Reading or editing a user record: the user themself, or admin and above.
pub fn authorize_user_update(principal: Option<&Principal>, target: Uuid) -> Decision {
    match principal {
        Some(p) if p.id == target => Decision::Allow,
        _ => authorize(principal, Role::Admin),
    }
}

/// The superuser profile is only reachable with a superuser token.
pub fn authorize_superuser_profile(principal: Option<&Principal>) -> Decision {
    authorize(principal, Role::SuperUser)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            role,
        }
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        assert_eq!(
            authorize(None, Role::User),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert!(matches!(
            authorize(None, Role::User).into_result(),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_role_ordering_enforced() {
        let user = principal(Role::User);
        let admin = principal(Role::Admin);
        let superuser = principal(Role::SuperUser);

        assert_eq!(
            authorize(Some(&user), Role::Admin),
            Decision::Deny(DenyReason::Forbidden)
        );
        assert!(authorize(Some(&admin), Role::Admin).is_allowed());
        assert!(authorize(Some(&superuser), Role::Admin).is_allowed());
        assert!(!authorize(Some(&admin), Role::SuperUser).is_allowed());
    }

    #[test]
    fn test_self_deletion_forbidden_for_every_role() {
        for role in [Role::User, Role::Admin, Role::SuperUser] {
            let actor = principal(role);
            assert_eq!(
                authorize_user_deletion(Some(&actor), actor.id),
                Decision::Deny(DenyReason::Forbidden)
            );
        }
    }

    #[test]
    fn test_admin_may_delete_others() {
        let admin = principal(Role::Admin);
        assert!(authorize_user_deletion(Some(&admin), Uuid::new_v4()).is_allowed());

        let user = principal(Role::User);
        assert!(!authorize_user_deletion(Some(&user), Uuid::new_v4()).is_allowed());
        assert_eq!(
            authorize_user_deletion(None, Uuid::new_v4()),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn test_user_update_own_record_only() {
        let user = principal(Role::User);
        assert!(authorize_user_update(Some(&user), user.id).is_allowed());
        assert_eq!(
            authorize_user_update(Some(&user), Uuid::new_v4()),
            Decision::Deny(DenyReason::Forbidden)
        );

        let admin = principal(Role::Admin);
        assert!(authorize_user_update(Some(&admin), Uuid::new_v4()).is_allowed());
    }

    #[test]
    fn test_superuser_profile_requires_superuser() {
        assert!(authorize_superuser_profile(Some(&principal(Role::SuperUser))).is_allowed());
        assert!(!authorize_superuser_profile(Some(&principal(Role::Admin))).is_allowed());
    }
}

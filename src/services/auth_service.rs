//! Authentication service - Credential checks and session token issuance.
//!
//! Regular users and the superuser live in separate stores. Signin tries the
//! superuser store first whenever an active superuser exists, then falls back to
//! the user store. Every failure collapses into `InvalidCredentials`.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{
    normalize_email, validate_plain, HashPolicy, NewSuperUser, NewUser, Password, Principal, Role,
    SuperUser, User,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::services::bootstrap::{BootstrapState, GatedOperation};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Token part of a session
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Identity plus token returned by every signin-like operation
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// True for admins and the superuser
    pub is_admin: bool,
    pub is_super_user: bool,
    #[serde(flatten)]
    pub token: TokenResponse,
}

/// Input for creating the superuser
#[derive(Debug, Clone)]
pub struct SuperUserSignup {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Origin marker stored with the record (`system` or `cli`)
    pub created_by: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a regular user and open a session for it
    async fn register(&self, name: String, email: String, password: String) -> AppResult<SessionResponse>;

    /// Sign in as the superuser or a regular user
    async fn signin(&self, email: String, password: String) -> AppResult<SessionResponse>;

    /// Sign in against the superuser store only
    async fn signin_superuser(&self, email: String, password: String) -> AppResult<SessionResponse>;

    /// Create the one active superuser
    async fn create_superuser(&self, signup: SuperUserSignup) -> AppResult<SessionResponse>;

    /// Re-issue a session after the user record changed
    fn session_for_user(&self, user: &User) -> AppResult<SessionResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Sign a token for the given identity.
fn issue_session(
    id: Uuid,
    name: &str,
    email: &str,
    role: Role,
    config: &Config,
) -> AppResult<SessionResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: id,
        email: email.to_string(),
        role,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(SessionResponse {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role,
        is_admin: role.is_admin(),
        is_super_user: role == Role::SuperUser,
        token: TokenResponse {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
        },
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

fn required(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    fn session_for_superuser(&self, superuser: &SuperUser) -> AppResult<SessionResponse> {
        issue_session(
            superuser.id,
            &superuser.name,
            &superuser.email,
            superuser.role(),
            &self.config,
        )
    }

    /// Verify against the active superuser and stamp the login on success.
    async fn try_superuser(&self, email: &str, password: &str) -> AppResult<Option<SessionResponse>> {
        let Some(superuser) = self.uow.superusers().find_active_by_email(email).await? else {
            return Ok(None);
        };

        let stored = Password::from_hash(superuser.password_hash.clone());
        if !stored.verify_blocking(password.to_string()).await? {
            return Ok(None);
        }

        self.uow.superusers().record_login(superuser.id, Utc::now()).await?;
        tracing::info!(user_id = %superuser.id, role = %Role::SuperUser, "Superuser signed in");

        self.session_for_superuser(&superuser).map(Some)
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, name: String, email: String, password: String) -> AppResult<SessionResponse> {
        required("Name", &name)?;
        required("Email", &email)?;
        let email = normalize_email(&email);

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::hash_blocking(password, HashPolicy::Standard)
            .await?
            .into_string();

        let user = self
            .uow
            .users()
            .create(NewUser {
                name: name.trim().to_string(),
                email,
                password_hash,
                is_admin: false,
            })
            .await?;

        tracing::info!(user_id = %user.id, email = %user.email, "User registered");
        self.session_for_user(&user)
    }

    async fn signin(&self, email: String, password: String) -> AppResult<SessionResponse> {
        let email = normalize_email(&email);

        if self.uow.superusers().count_active().await? > 0 {
            if let Some(session) = self.try_superuser(&email, &password).await? {
                return Ok(session);
            }
        }

        let user_result = self.uow.users().find_by_email(&email).await?;

        // Verify against a dummy hash when the account is missing so timing
        // does not reveal which emails are registered.
        let stored = match &user_result {
            Some(user) => Password::from_hash(user.password_hash.clone()),
            None => Password::dummy(),
        };
        let password_valid = stored.verify_blocking(password).await?;

        match user_result {
            Some(user) if password_valid => {
                tracing::info!(user_id = %user.id, role = %user.role(), "User signed in");
                self.session_for_user(&user)
            }
            _ => {
                tracing::warn!(email = %email, "Failed signin attempt");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn signin_superuser(&self, email: String, password: String) -> AppResult<SessionResponse> {
        let email = normalize_email(&email);

        match self.try_superuser(&email, &password).await? {
            Some(session) => Ok(session),
            None => {
                tracing::warn!(email = %email, "Failed superuser signin attempt");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn create_superuser(&self, signup: SuperUserSignup) -> AppResult<SessionResponse> {
        required("Name", &signup.name)?;
        required("Email", &signup.email)?;
        validate_plain(&signup.password)?;

        let active = self.uow.superusers().count_active().await?;
        let state = BootstrapState::default().resolve(active);
        state.check(GatedOperation::CreateSuperUser).map_err(|e| {
            tracing::warn!("Rejected superuser creation: one already exists");
            e
        })?;

        let password_hash = Password::hash_blocking(signup.password, HashPolicy::Elevated)
            .await?
            .into_string();

        let superuser = self
            .uow
            .superusers()
            .create_first(NewSuperUser {
                name: signup.name.trim().to_string(),
                email: normalize_email(&signup.email),
                password_hash,
                created_by: signup.created_by,
            })
            .await?;

        tracing::info!(
            user_id = %superuser.id,
            email = %superuser.email,
            created_by = %superuser.created_by,
            state = ?state.after_superuser_created(),
            "Superuser created"
        );
        self.session_for_superuser(&superuser)
    }

    fn session_for_user(&self, user: &User) -> AppResult<SessionResponse> {
        issue_session(user.id, &user.name, &user.email, user.role(), &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SUPERUSER_CREATED_BY_SYSTEM;
    use crate::infra::{MockSuperUserRepository, MockUserRepository};
    use crate::services::test_support::MockUow;
    use mockall::predicate::eq;

    const SECRET: &str = "test-secret-key-that-is-at-least-32-chars";

    fn config() -> Config {
        Config::new("postgres://localhost/test", SECRET).unwrap()
    }

    fn user(email: &str, password: &str, is_admin: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            email: email.into(),
            password_hash: Password::new(password, HashPolicy::Standard).unwrap().into_string(),
            is_admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn superuser(email: &str, password: &str) -> SuperUser {
        SuperUser {
            id: Uuid::new_v4(),
            name: "Root".into(),
            email: email.into(),
            password_hash: Password::new(password, HashPolicy::Standard).unwrap().into_string(),
            is_active: true,
            created_by: SUPERUSER_CREATED_BY_SYSTEM.into(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn authenticator(users: MockUserRepository, superusers: MockSuperUserRepository) -> Authenticator<MockUow> {
        Authenticator::new(Arc::new(MockUow::new(users, superusers)), config())
    }

    #[tokio::test]
    async fn test_register_stores_hash_and_returns_user_session() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("jane@example.com"))
            .returning(|_| Ok(None));
        users.expect_create().returning(|new_user| {
            assert_ne!(new_user.password_hash, "secret1");
            assert!(Password::from_hash(new_user.password_hash.clone()).verify("secret1"));
            Ok(User {
                id: Uuid::new_v4(),
                name: new_user.name,
                email: new_user.email,
                password_hash: new_user.password_hash,
                is_admin: new_user.is_admin,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

        let auth = authenticator(users, MockSuperUserRepository::new());
        let session = auth
            .register("Jane".into(), " Jane@Example.com ".into(), "secret1".into())
            .await
            .unwrap();

        assert_eq!(session.role, Role::User);
        assert_eq!(session.email, "jane@example.com");
        assert!(!session.is_admin);
        assert!(!session.is_super_user);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let existing = user("jane@example.com", "secret1", false);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));

        let auth = authenticator(users, MockSuperUserRepository::new());
        let result = auth
            .register("Jane".into(), "jane@example.com".into(), "secret1".into())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_short_password_rejected() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let auth = authenticator(users, MockSuperUserRepository::new());
        let result = auth
            .register("Jane".into(), "jane@example.com".into(), "12345".into())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_signin_prefers_superuser_and_records_login() {
        let root = superuser("root@example.com", "rootpass");
        let root_id = root.id;

        let mut superusers = MockSuperUserRepository::new();
        superusers.expect_count_active().returning(|| Ok(1));
        superusers
            .expect_find_active_by_email()
            .with(eq("root@example.com"))
            .returning(move |_| Ok(Some(root.clone())));
        superusers
            .expect_record_login()
            .withf(move |id, _| *id == root_id)
            .times(1)
            .returning(|_, _| Ok(()));

        let auth = authenticator(MockUserRepository::new(), superusers);
        let session = auth
            .signin("ROOT@example.com".into(), "rootpass".into())
            .await
            .unwrap();

        assert_eq!(session.role, Role::SuperUser);
        assert!(session.is_admin);
        assert!(session.is_super_user);
    }

    #[tokio::test]
    async fn test_signin_falls_back_to_user_without_superuser() {
        let admin = user("admin@example.com", "adminpass", true);

        let mut superusers = MockSuperUserRepository::new();
        superusers.expect_count_active().returning(|| Ok(0));
        superusers.expect_find_active_by_email().never();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(admin.clone())));

        let auth = authenticator(users, superusers);
        let session = auth
            .signin("admin@example.com".into(), "adminpass".into())
            .await
            .unwrap();

        assert_eq!(session.role, Role::Admin);
        assert!(session.is_admin);
        assert!(!session.is_super_user);
    }

    #[tokio::test]
    async fn test_signin_wrong_password_is_generic() {
        let jane = user("jane@example.com", "secret1", false);

        let mut superusers = MockSuperUserRepository::new();
        superusers.expect_count_active().returning(|| Ok(0));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(jane.clone())));

        let auth = authenticator(users, superusers);
        let err = auth
            .signin("jane@example.com".into(), "wrong-one".into())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_signin_unknown_email_is_generic() {
        let mut superusers = MockSuperUserRepository::new();
        superusers.expect_count_active().returning(|| Ok(0));
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let auth = authenticator(users, superusers);
        let result = auth.signin("ghost@example.com".into(), "whatever".into()).await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_create_superuser_rejected_when_one_exists() {
        let mut superusers = MockSuperUserRepository::new();
        superusers.expect_count_active().returning(|| Ok(1));
        superusers.expect_create_first().never();

        let auth = authenticator(MockUserRepository::new(), superusers);
        let result = auth
            .create_superuser(SuperUserSignup {
                name: "Root".into(),
                email: "root@example.com".into(),
                password: "rootpass".into(),
                created_by: SUPERUSER_CREATED_BY_SYSTEM.into(),
            })
            .await;

        assert!(matches!(result, Err(AppError::SuperUserExists)));
    }

    #[tokio::test]
    async fn test_create_superuser_validates_before_existence_check() {
        let mut superusers = MockSuperUserRepository::new();
        superusers.expect_count_active().never();
        superusers.expect_create_first().never();

        let auth = authenticator(MockUserRepository::new(), superusers);
        let result = auth
            .create_superuser(SuperUserSignup {
                name: "Root".into(),
                email: "root@example.com".into(),
                password: "123".into(),
                created_by: SUPERUSER_CREATED_BY_SYSTEM.into(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_superuser_uses_elevated_hash() {
        let mut superusers = MockSuperUserRepository::new();
        superusers.expect_count_active().returning(|| Ok(0));
        superusers.expect_create_first().returning(|new| {
            assert!(new.password_hash.contains("m=65536,t=3"));
            assert_eq!(new.email, "root@example.com");
            Ok(SuperUser {
                id: Uuid::new_v4(),
                name: new.name,
                email: new.email,
                password_hash: new.password_hash,
                is_active: true,
                created_by: new.created_by,
                last_login: Some(Utc::now()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

        let auth = authenticator(MockUserRepository::new(), superusers);
        let session = auth
            .create_superuser(SuperUserSignup {
                name: "Root".into(),
                email: "Root@Example.com".into(),
                password: "rootpass".into(),
                created_by: SUPERUSER_CREATED_BY_SYSTEM.into(),
            })
            .await
            .unwrap();

        assert_eq!(session.role, Role::SuperUser);
    }

    #[test]
    fn test_token_roundtrip_claims() {
        let auth = authenticator(MockUserRepository::new(), MockSuperUserRepository::new());
        let jane = user("jane@example.com", "secret1", true);

        let session = auth.session_for_user(&jane).unwrap();
        let claims = auth.verify_token(&session.token.access_token).unwrap();

        assert_eq!(claims.sub, jane.id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = authenticator(MockUserRepository::new(), MockSuperUserRepository::new());
        let jane = user("jane@example.com", "secret1", false);
        let token = auth.session_for_user(&jane).unwrap().token.access_token;

        let other = Config::new("postgres://localhost/test", "another-secret-that-is-32-chars-long!").unwrap();
        assert!(verify_token_internal(&token, &other).is_err());
    }

    #[test]
    fn test_session_json_shape() {
        let auth = authenticator(MockUserRepository::new(), MockSuperUserRepository::new());
        let session = auth
            .session_for_user(&user("jane@example.com", "secret1", false))
            .unwrap();
        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["role"], "user");
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["token_type"], "Bearer");
        assert!(json["access_token"].is_string());
    }
}

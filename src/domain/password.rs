//! Password value object - Domain layer password handling.
//!
//! Two hashing policies exist: regular accounts use argon2 defaults, the
//! superuser path uses a higher memory and time cost. Verification reads the
//! parameters from the stored PHC string, so either hash verifies with the same
//! code path.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::{
    ELEVATED_ARGON2_MEMORY_KIB, ELEVATED_ARGON2_PARALLELISM, ELEVATED_ARGON2_TIME_COST,
    MIN_PASSWORD_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Hash that never verifies. Used when the account does not exist so that the
/// failed lookup costs the same as a wrong password.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$0Y4tUWGkYvGOJsmCThQBmQ5L0yzJsPtlPuWM3a0K4vU";

/// Work factor applied when hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashPolicy {
    /// Regular users and admins
    Standard,
    /// Superuser accounts
    Elevated,
}

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Validate and hash a plain text password.
    ///
    /// # Errors
    /// Returns validation error if the password is blank or too short.
    pub fn new(plain_text: &str, policy: HashPolicy) -> AppResult<Self> {
        validate_plain(plain_text)?;
        let hash = Self::hash(plain_text, policy)?;
        Ok(Self { hash })
    }

    /// Hash on the blocking pool. Argon2 is CPU bound and must not stall the runtime.
    pub async fn hash_blocking(plain_text: String, policy: HashPolicy) -> AppResult<Self> {
        tokio::task::spawn_blocking(move || Self::new(&plain_text, policy))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {}", e)))?
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// A hash that never matches any input.
    pub fn dummy() -> Self {
        Self::from_hash(DUMMY_HASH.to_string())
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        Self::verify_hash(plain_text, &self.hash).unwrap_or(false)
    }

    /// Verify on the blocking pool.
    pub async fn verify_blocking(self, plain_text: String) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || self.verify(&plain_text))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {}", e)))
    }

    fn hash(plain_text: &str, policy: HashPolicy) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2(policy)?
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_hash(plain_text: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
        // Params come from the PHC string; the instance defaults are irrelevant here.
        Ok(Argon2::default()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    fn argon2(policy: HashPolicy) -> AppResult<Argon2<'static>> {
        match policy {
            HashPolicy::Standard => Ok(Argon2::default()),
            HashPolicy::Elevated => {
                let params = Params::new(
                    ELEVATED_ARGON2_MEMORY_KIB,
                    ELEVATED_ARGON2_TIME_COST,
                    ELEVATED_ARGON2_PARALLELISM,
                    None,
                )
                .map_err(|e| AppError::internal(format!("Invalid Argon2 params: {}", e)))?;
                Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
            }
        }
    }
}

/// Password rules shared by every account type.
pub fn validate_plain(plain_text: &str) -> AppResult<()> {
    if plain_text.is_empty() {
        return Err(AppError::validation("Password is required"));
    }
    if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::new(plain, HashPolicy::Standard).unwrap();

        assert_ne!(password.as_str(), plain);
        assert!(password.verify(plain));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_elevated_policy_uses_stronger_params() {
        let standard = Password::new("secret-one", HashPolicy::Standard).unwrap();
        let elevated = Password::new("secret-one", HashPolicy::Elevated).unwrap();

        assert!(standard.as_str().contains("m=19456,t=2"));
        assert!(elevated.as_str().contains("m=65536,t=3"));
        assert!(elevated.verify("secret-one"));
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "TestPassword123";
        let password = Password::new(plain, HashPolicy::Standard).unwrap();
        let restored = Password::from_hash(password.into_string());
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let pass1 = Password::new(plain, HashPolicy::Standard).unwrap();
        let pass2 = Password::new(plain, HashPolicy::Standard).unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_password_too_short() {
        assert!(Password::new("12345", HashPolicy::Standard).is_err());
        assert!(Password::new("", HashPolicy::Elevated).is_err());
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(Password::new("123456", HashPolicy::Standard).is_ok());
    }

    #[test]
    fn test_dummy_never_verifies() {
        assert!(!Password::dummy().verify(""));
        assert!(!Password::dummy().verify("dummy"));
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let password = Password::hash_blocking("off-runtime".into(), HashPolicy::Standard)
            .await
            .unwrap();
        assert!(password.verify_blocking("off-runtime".into()).await.unwrap());
    }
}

//! Application settings loaded from environment variables.

use std::env;

use chrono::{FixedOffset, Offset, Utc};

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// Rate limiting is disabled when unset.
    pub redis_url: Option<String>,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Offset used to bucket orders into calendar days for sales reports.
    pub report_utc_offset: FixedOffset,
    /// Key rate limits on `X-Forwarded-For`/`X-Real-IP`. Only set behind a
    /// proxy that overwrites them.
    pub trust_proxy_headers: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[REDACTED]"))
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("report_utc_offset", &self.report_utc_offset)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` when present).
    ///
    /// # Errors
    /// Fails if `JWT_SECRET` is missing or shorter than the minimum length.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Config("JWT_SECRET environment variable must be set".into()))?;

        let minutes: i32 = env::var("REPORT_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        Self::new(
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
        )
        .map(|config| Self {
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            report_utc_offset: offset_from_minutes(minutes),
            trust_proxy_headers: env::var("TRUST_PROXY_HEADERS")
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(false),
            ..config
        })
    }

    /// Build a configuration with defaults for everything but the database URL and
    /// signing secret.
    ///
    /// # Errors
    /// Fails if the secret is shorter than the minimum length.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> AppResult<Self> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::Config(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: database_url.into(),
            redis_url: None,
            jwt_secret,
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            report_utc_offset: Utc.fix(),
            trust_proxy_headers: false,
        })
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        let result = Config::new("postgres://localhost/db", "too-short");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::new("postgres://user:pw@localhost/db", "a".repeat(40)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("aaaa"));
        assert!(!debug.contains("pw@"));
    }

    #[test]
    fn test_offset_from_minutes() {
        assert_eq!(offset_from_minutes(120).local_minus_utc(), 7200);
        assert_eq!(offset_from_minutes(-300).local_minus_utc(), -18000);
        // Out of range falls back to UTC
        assert_eq!(offset_from_minutes(100_000).local_minus_utc(), 0);
    }
}

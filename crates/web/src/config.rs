//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CROWDFUND_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `CROWDFUND_HOST` - Bind address (default: 127.0.0.1)
//! - `CROWDFUND_PORT` - Listen port (default: 3000)
//! - `CROWDFUND_BASE_URL` - Public URL for the site (default: <http://localhost:3000>)
//! - `CROWDFUND_SESSION_TTL_DAYS` - Session inactivity expiry in days, 1 to 3650 (default: 7)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
/// Ten years; the expiry in seconds and the cookie date stay in range.
const MAX_SESSION_TTL_DAYS: i64 = 3650;

pub(crate) const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Session inactivity expiry in days
    pub session_ttl_days: i64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CROWDFUND_DATABASE_URL")?;
        let host = get_env_or_default("CROWDFUND_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CROWDFUND_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("CROWDFUND_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CROWDFUND_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("CROWDFUND_BASE_URL", "http://localhost:3000");
        let session_ttl_days = parse_session_ttl(get_optional_env("CROWDFUND_SESSION_TTL_DAYS"))?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_ttl_days,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (enables secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse the session TTL, which must be a positive number of days.
fn parse_session_ttl(value: Option<String>) -> Result<i64, ConfigError> {
    let Some(raw) = value else {
        return Ok(DEFAULT_SESSION_TTL_DAYS);
    };

    match raw.parse::<i64>() {
        Ok(days) if days <= 0 => Err(ConfigError::InvalidEnvVar(
            "CROWDFUND_SESSION_TTL_DAYS".to_string(),
            format!("must be positive (got {days})"),
        )),
        Ok(days) if days > MAX_SESSION_TTL_DAYS => Err(ConfigError::InvalidEnvVar(
            "CROWDFUND_SESSION_TTL_DAYS".to_string(),
            format!("must be at most {MAX_SESSION_TTL_DAYS} (got {days})"),
        )),
        Ok(days) => Ok(days),
        Err(e) => Err(ConfigError::InvalidEnvVar(
            "CROWDFUND_SESSION_TTL_DAYS".to_string(),
            e.to_string(),
        )),
    }
}

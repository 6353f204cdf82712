//! Configuration for the Auth API service.

use std::time::Duration;
use warden_auth_core::AuthConfig;

/// Auth API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Auth core configuration
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let signing_secret =
            lookup("SIGNING_SECRET").ok_or(ConfigError::Missing("SIGNING_SECRET"))?;

        let http_port: u16 = parse_or(&lookup, "HTTP_PORT", 8080)?;
        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        let access_ttl_secs: u64 = parse_or(&lookup, "ACCESS_TOKEN_TTL_SECS", 3600)?;
        let access_max_ttl_secs: u64 =
            parse_or(&lookup, "ACCESS_TOKEN_MAX_TTL_SECS", access_ttl_secs.max(3600))?;
        let refresh_ttl_days: u64 = parse_or(&lookup, "REFRESH_TOKEN_TTL_DAYS", 60)?;
        let refresh_ttl_secs = refresh_ttl_days
            .checked_mul(24 * 60 * 60)
            .ok_or(ConfigError::Invalid("REFRESH_TOKEN_TTL_DAYS"))?;
        let password_cost: u32 =
            parse_or(&lookup, "PASSWORD_COST", AuthConfig::DEFAULT_PASSWORD_COST)?;
        let rotate: bool = parse_or(&lookup, "ROTATE_REFRESH_TOKENS", false)?;

        let mut auth = AuthConfig::try_new(signing_secret)
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?
            .with_access_token_ttl(
                Duration::from_secs(access_ttl_secs),
                Duration::from_secs(access_max_ttl_secs),
            )
            .with_refresh_token_ttl(Duration::from_secs(refresh_ttl_secs))
            .with_password_cost(password_cost)
            .with_refresh_rotation(rotate);

        if let Some(key) = lookup("WEBHOOK_API_KEY").filter(|k| !k.is_empty()) {
            auth = auth.with_api_key(key);
        }

        auth.validate()
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?;

        Ok(Self {
            http_port,
            database_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            auth,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}

//! Configuration types for the auth core

use std::time::Duration;

use crate::password::{MAX_PASSWORD_COST, MIN_PASSWORD_COST};
use crate::AuthError;

/// Auth core configuration
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access token signing
    pub signing_secret: String,
    /// `iss` claim written into and required on access tokens
    pub issuer: String,
    /// Access token lifetime when the caller does not ask for one
    pub access_token_ttl: Duration,
    /// Upper bound on any access token lifetime
    pub access_token_max_ttl: Duration,
    /// Refresh token lifetime, fixed at creation
    pub refresh_token_ttl: Duration,
    /// bcrypt cost factor
    pub password_cost: u32,
    /// Preshared key for the webhook path. `None` rejects every key.
    pub api_key: Option<String>,
    /// Revoke-and-reissue the refresh token on every refresh
    pub rotate_refresh_tokens: bool,
}

impl AuthConfig {
    /// Minimum signing secret length in bytes (256 bits)
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Default issuer claim
    pub const DEFAULT_ISSUER: &'static str = "warden";

    /// Default bcrypt cost (tens of milliseconds per hash)
    pub const DEFAULT_PASSWORD_COST: u32 = 10;

    /// Create a new auth config, validating the signing secret
    pub fn try_new(signing_secret: impl Into<String>) -> Result<Self, AuthError> {
        let signing_secret = signing_secret.into();
        if signing_secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(AuthError::Configuration(format!(
                "signing secret too short: got {} bytes, need at least {}",
                signing_secret.len(),
                Self::MIN_SECRET_LENGTH
            )));
        }

        Ok(Self {
            signing_secret,
            issuer: Self::DEFAULT_ISSUER.to_string(),
            access_token_ttl: Duration::from_secs(60 * 60), // 1 hour
            access_token_max_ttl: Duration::from_secs(60 * 60), // 1 hour
            refresh_token_ttl: Duration::from_secs(60 * 24 * 60 * 60), // 60 days
            password_cost: Self::DEFAULT_PASSWORD_COST,
            api_key: None,
            rotate_refresh_tokens: false,
        })
    }

    /// Set the issuer claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set default and ceiling access token lifetimes
    pub fn with_access_token_ttl(mut self, default: Duration, max: Duration) -> Self {
        self.access_token_ttl = default;
        self.access_token_max_ttl = max;
        self
    }

    /// Set refresh token lifetime
    pub fn with_refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    /// Set bcrypt cost
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Set the webhook API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Enable or disable refresh token rotation
    pub fn with_refresh_rotation(mut self, enabled: bool) -> Self {
        self.rotate_refresh_tokens = enabled;
        self
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.access_token_ttl.is_zero() || self.access_token_max_ttl.is_zero() {
            return Err(AuthError::Configuration(
                "access token lifetimes must be positive".to_string(),
            ));
        }
        if self.access_token_ttl > self.access_token_max_ttl {
            return Err(AuthError::Configuration(
                "default access token lifetime exceeds the ceiling".to_string(),
            ));
        }
        if self.refresh_token_ttl.is_zero() {
            return Err(AuthError::Configuration(
                "refresh token lifetime must be positive".to_string(),
            ));
        }
        if !(MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&self.password_cost) {
            return Err(AuthError::Configuration(format!(
                "password cost must be between {MIN_PASSWORD_COST} and {MAX_PASSWORD_COST}"
            )));
        }
        if self.api_key.as_deref().is_some_and(str::is_empty) {
            return Err(AuthError::Configuration("API key must not be empty".to_string()));
        }
        Ok(())
    }

    /// Resolve a requested access token lifetime against the default and ceiling.
    ///
    /// `None` or zero picks the default; anything longer than the ceiling is clamped.
    pub fn resolve_access_ttl(&self, requested: Option<Duration>) -> Duration {
        match requested {
            Some(ttl) if !ttl.is_zero() => ttl.min(self.access_token_max_ttl),
            _ => self.access_token_ttl,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer", &self.issuer)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("access_token_max_ttl", &self.access_token_max_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("password_cost", &self.password_cost)
            .field("api_key_configured", &self.api_key.is_some())
            .field("rotate_refresh_tokens", &self.rotate_refresh_tokens)
            .finish_non_exhaustive()
    }
}

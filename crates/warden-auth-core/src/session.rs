//! Session manager - login, refresh, revoke and authorize
//!
//! Ties together password verification, access token signing and the refresh
//! token store. Every protected operation goes through [`SessionManager::authorize`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use http::HeaderMap;
use uuid::Uuid;
use warden_db::{CreateUser, DbError, RefreshTokenRepository, UserRepository};
use warden_types::{IssuedRefreshToken, TokenPair, UserId, UserProfile};

use crate::{
    api_key::ApiKeyValidator,
    bearer::{bearer_from_headers, credential_from_headers, extract_bearer, API_KEY_SCHEME},
    config::AuthConfig,
    crypto::token_fingerprint,
    password::PasswordHasher,
    refresh::RefreshTokenStore,
    token::TokenSigner,
    AuthError,
};

/// Plaintext behind the dummy hash verified for unknown emails
const DUMMY_PASSWORD: &str = "warden-dummy-password";

/// Canonical form of an email for storage and lookup
fn normalize_email(email: &str) -> &str {
    email.trim()
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

/// Result of a successful refresh
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// Owner of the refresh token
    pub user_id: UserId,
    /// New access token
    pub access_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Replacement refresh token, only when rotation is on
    pub rotated: Option<IssuedRefreshToken>,
}

/// Session manager
///
/// Holds only immutable state plus the repositories, so it is shared across
/// requests behind an `Arc`.
pub struct SessionManager<U: UserRepository, R: RefreshTokenRepository> {
    config: AuthConfig,
    signer: TokenSigner,
    refresh_tokens: RefreshTokenStore<R>,
    hasher: PasswordHasher,
    api_keys: ApiKeyValidator,
    dummy_hash: Arc<str>,
    users: Arc<U>,
}

impl<U: UserRepository, R: RefreshTokenRepository> Clone for SessionManager<U, R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            signer: self.signer.clone(),
            refresh_tokens: self.refresh_tokens.clone(),
            hasher: self.hasher,
            api_keys: self.api_keys.clone(),
            dummy_hash: Arc::clone(&self.dummy_hash),
            users: Arc::clone(&self.users),
        }
    }
}

impl<U: UserRepository, R: RefreshTokenRepository> SessionManager<U, R> {
    /// Create a session manager.
    ///
    /// Validates the config and computes the dummy hash once, at the
    /// configured cost.
    pub fn new(config: AuthConfig, users: Arc<U>, refresh_repo: Arc<R>) -> Result<Self, AuthError> {
        config.validate()?;

        let hasher = PasswordHasher::new(config.password_cost);
        let dummy_hash: Arc<str> = hasher.hash(DUMMY_PASSWORD)?.into();

        Ok(Self {
            signer: TokenSigner::new(&config),
            refresh_tokens: RefreshTokenStore::new(refresh_repo, config.refresh_token_ttl)?,
            api_keys: ApiKeyValidator::new(config.api_key.clone()),
            hasher,
            dummy_hash,
            users,
            config,
        })
    }

    /// The config this manager was built from
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// The access token signer
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// The refresh token store
    pub fn refresh_tokens(&self) -> &RefreshTokenStore<R> {
        &self.refresh_tokens
    }

    // =========================================================================
    // Login / Registration
    // =========================================================================

    /// Exchange email and password for an access + refresh token pair.
    ///
    /// Unknown email and wrong password both return `InvalidCredentials`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl: Option<Duration>,
    ) -> Result<LoginOutcome, AuthError> {
        let user = self.users.find_by_email(normalize_email(email)).await?;

        let Some(user) = user else {
            // Burn the same bcrypt work as a real check
            let _ = self
                .hasher
                .verify_async(self.dummy_hash.to_string(), password.to_string())
                .await;
            tracing::debug!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let verified = self
            .hasher
            .verify_async(user.hashed_password.clone(), password.to_string())
            .await
            .unwrap_or_else(|e| {
                tracing::error!(user_id = %user.id, "Password check failed: {}", e);
                false
            });

        if !verified {
            tracing::debug!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let user_id = user.user_id();
        let ttl = self.config.resolve_access_ttl(requested_ttl);
        let access_token = self.signer.issue(user_id, ttl)?;
        let refresh = self.refresh_tokens.create(user_id).await?;

        tracing::info!(user_id = %user_id, "User logged in");

        Ok(LoginOutcome {
            user: user.profile(),
            tokens: TokenPair {
                access_token,
                refresh_token: refresh.token,
                expires_in: ttl.as_secs(),
                refresh_expires_at: refresh.expires_at,
            },
        })
    }

    /// Create an account. A duplicate email is `EmailTaken`, and a password
    /// bcrypt would truncate is `PasswordTooLong`.
    pub async fn register(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let email = normalize_email(email);
        let hashed_password = self.hasher.hash_async(password.to_string()).await?;

        let row = self
            .users
            .create(CreateUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
                hashed_password,
            })
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => AuthError::EmailTaken,
                other => other.into(),
            })?;

        tracing::info!(user_id = %row.id, "User registered");
        Ok(row.profile())
    }

    // =========================================================================
    // Refresh Tokens
    // =========================================================================

    /// Issue a fresh access token for the owner of an active refresh token.
    ///
    /// The refresh token is left untouched unless rotation is enabled, in
    /// which case it is revoked and a replacement is returned.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, AuthError> {
        let record = self
            .refresh_tokens
            .lookup_active_at(refresh_token, Utc::now())
            .await?;

        let rotated = if self.config.rotate_refresh_tokens {
            Some(self.refresh_tokens.rotate(refresh_token, record.user_id).await?)
        } else {
            None
        };

        let ttl = self.config.access_token_ttl;
        let access_token = self.signer.issue(record.user_id, ttl)?;

        tracing::debug!(
            user_id = %record.user_id,
            token = %token_fingerprint(refresh_token),
            rotated = rotated.is_some(),
            "Access token refreshed"
        );

        Ok(RefreshOutcome {
            user_id: record.user_id,
            access_token,
            expires_in: ttl.as_secs(),
            rotated,
        })
    }

    /// Revoke a refresh token. Succeeds whatever its prior state.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh_tokens.revoke(refresh_token).await?;
        Ok(())
    }

    /// Revoke every refresh token a user holds
    pub async fn revoke_all(&self, user_id: UserId) -> Result<u64, AuthError> {
        self.refresh_tokens.revoke_all(user_id).await
    }

    /// Delete expired and revoked refresh tokens
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        self.refresh_tokens.purge_expired().await
    }

    // =========================================================================
    // Authorization
    // =========================================================================

    /// Resolve the caller of a protected operation from request headers
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<UserId, AuthError> {
        let token = bearer_from_headers(headers)?;
        self.signer.validate(token)
    }

    /// Resolve the caller from a raw `Authorization` header value
    pub fn authorize_header(&self, header: Option<&str>) -> Result<UserId, AuthError> {
        let token = extract_bearer(header)?;
        self.signer.validate(token)
    }

    /// Check the `ApiKey` credential of a trusted backend caller
    pub async fn authorize_api_key(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let key = credential_from_headers(headers, API_KEY_SCHEME).map_err(|e| {
            tracing::debug!("API key credential rejected: {}", e);
            AuthError::InvalidApiKey
        })?;

        if !self.api_keys.validate(key) {
            tracing::warn!(configured = self.api_keys.is_configured(), "Invalid API key presented");
            return Err(AuthError::InvalidApiKey);
        }
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Profile of an authorized user
    pub async fn current_user(&self, user_id: UserId) -> Result<UserProfile, AuthError> {
        self.users
            .find_by_id(user_id.0)
            .await?
            .map(|row| row.profile())
            .ok_or(AuthError::UserNotFound)
    }

    /// Flag a user as premium
    pub async fn upgrade_user(&self, user_id: UserId) -> Result<(), AuthError> {
        if !self.users.set_premium(user_id.0).await? {
            return Err(AuthError::UserNotFound);
        }
        tracing::info!(user_id = %user_id, "User upgraded to premium");
        Ok(())
    }
}

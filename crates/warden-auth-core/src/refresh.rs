//! Refresh token lifecycle
//!
//! Storage belongs to the repository; the rules live here. A token is
//! `Active` until it expires or is revoked, and both of those are terminal.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use warden_db::{CreateRefreshToken, RefreshTokenRepository};
use warden_types::{IssuedRefreshToken, RefreshTokenRecord, RefreshTokenState, UserId};

use crate::crypto::{random_hex, token_fingerprint, REFRESH_TOKEN_BYTES};
use crate::AuthError;

/// Persistence-backed refresh token store
pub struct RefreshTokenStore<R: RefreshTokenRepository> {
    repo: Arc<R>,
    ttl: ChronoDuration,
}

impl<R: RefreshTokenRepository> Clone for RefreshTokenStore<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            ttl: self.ttl,
        }
    }
}

impl<R: RefreshTokenRepository> RefreshTokenStore<R> {
    /// Create a store issuing tokens that live for `ttl`
    pub fn new(repo: Arc<R>, ttl: Duration) -> Result<Self, AuthError> {
        let ttl = ChronoDuration::from_std(ttl).map_err(|_| {
            AuthError::Configuration("refresh token lifetime out of range".to_string())
        })?;
        Ok(Self { repo, ttl })
    }

    /// Mint and persist a new token for `user_id`
    pub async fn create(&self, user_id: UserId) -> Result<IssuedRefreshToken, AuthError> {
        self.create_at(user_id, Utc::now()).await
    }

    /// [`create`](Self::create) with an explicit clock
    pub async fn create_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<IssuedRefreshToken, AuthError> {
        let row = self.repo.create(self.mint(user_id, now)?).await?;

        tracing::debug!(
            user_id = %user_id,
            token = %token_fingerprint(&row.token),
            expires_at = %row.expires_at,
            "Refresh token created"
        );

        Ok(IssuedRefreshToken {
            token: row.token,
            expires_at: row.expires_at,
        })
    }

    /// Revoke `token` and hand back its successor in one atomic step.
    ///
    /// `TokenRevoked` if the token stopped being active before the write,
    /// which includes losing a race against another rotation of it.
    pub async fn rotate(
        &self,
        token: &str,
        user_id: UserId,
    ) -> Result<IssuedRefreshToken, AuthError> {
        self.rotate_at(token, user_id, Utc::now()).await
    }

    /// [`rotate`](Self::rotate) with an explicit clock
    pub async fn rotate_at(
        &self,
        token: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<IssuedRefreshToken, AuthError> {
        let successor = self.mint(user_id, now)?;
        let Some(row) = self.repo.rotate(token, successor).await? else {
            tracing::warn!(
                token = %token_fingerprint(token),
                user_id = %user_id,
                "Refresh token was no longer active at rotation"
            );
            return Err(AuthError::TokenRevoked);
        };

        tracing::debug!(
            user_id = %user_id,
            from = %token_fingerprint(token),
            to = %token_fingerprint(&row.token),
            "Refresh token rotated"
        );

        Ok(IssuedRefreshToken {
            token: row.token,
            expires_at: row.expires_at,
        })
    }

    fn mint(&self, user_id: UserId, now: DateTime<Utc>) -> Result<CreateRefreshToken, AuthError> {
        Ok(CreateRefreshToken {
            token: random_hex(REFRESH_TOKEN_BYTES)?,
            user_id: user_id.0,
            created_at: now,
            updated_at: now,
            expires_at: now + self.ttl,
        })
    }

    /// Find a token in any state. Unknown tokens are `InvalidToken`.
    pub async fn lookup(&self, token: &str) -> Result<RefreshTokenRecord, AuthError> {
        let row = self.repo.find_by_token(token).await?.ok_or_else(|| {
            tracing::debug!(token = %token_fingerprint(token), "Unknown refresh token");
            AuthError::InvalidToken
        })?;
        Ok(row.into())
    }

    /// Find a token and require it to be `Active` at `now`
    pub async fn lookup_active_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, AuthError> {
        let record = self.lookup(token).await?;
        match record.state_at(now) {
            RefreshTokenState::Active => Ok(record),
            RefreshTokenState::Expired => {
                tracing::debug!(
                    token = %token_fingerprint(token),
                    user_id = %record.user_id,
                    "Expired refresh token presented"
                );
                Err(AuthError::TokenExpired)
            }
            RefreshTokenState::Revoked => {
                tracing::warn!(
                    token = %token_fingerprint(token),
                    user_id = %record.user_id,
                    "Revoked refresh token presented"
                );
                Err(AuthError::TokenRevoked)
            }
        }
    }

    /// Revoke a token. Already revoked and unknown tokens succeed.
    ///
    /// Returns true if this call did the revoking.
    pub async fn revoke(&self, token: &str) -> Result<bool, AuthError> {
        let revoked = self.repo.revoke(token).await?;
        if revoked {
            tracing::info!(token = %token_fingerprint(token), "Refresh token revoked");
        } else {
            tracing::debug!(
                token = %token_fingerprint(token),
                "Refresh token already revoked or unknown"
            );
        }
        Ok(revoked)
    }

    /// Revoke every live token owned by `user_id`
    pub async fn revoke_all(&self, user_id: UserId) -> Result<u64, AuthError> {
        let count = self.repo.revoke_all_for_user(user_id.0).await?;
        tracing::info!(user_id = %user_id, count, "Revoked all refresh tokens for user");
        Ok(count)
    }

    /// Delete expired and revoked tokens
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let count = self.repo.delete_expired().await?;
        if count > 0 {
            tracing::info!(count, "Purged dead refresh tokens");
        }
        Ok(count)
    }

    /// Configured lifetime
    pub fn ttl(&self) -> ChronoDuration {
        self.ttl
    }
}

//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Create a new user. Fails with `DbError::Conflict` on a duplicate email.
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// Flag a user as premium. Returns false if no such user exists.
    async fn set_premium(&self, id: Uuid) -> DbResult<bool>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// Refresh token repository trait
///
/// Every mutating method is a single statement, so an abandoned call never
/// leaves partial state behind.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new refresh token
    async fn create(&self, token: CreateRefreshToken) -> DbResult<RefreshTokenRow>;

    /// Find a token by its value, whatever its state
    async fn find_by_token(&self, token: &str) -> DbResult<Option<RefreshTokenRow>>;

    /// Set `revoked_at` if it is not already set. Unknown tokens are a no-op.
    ///
    /// Returns true only for the call that actually revoked the token.
    async fn revoke(&self, token: &str) -> DbResult<bool>;

    /// Revoke `token` and persist `successor` in one atomic step.
    ///
    /// Only a token that is still active at the time of the write is
    /// replaced. Returns `None`, and persists nothing, when the token is
    /// unknown, expired or already revoked, so concurrent callers presenting
    /// the same token get at most one successor between them.
    async fn rotate(
        &self,
        token: &str,
        successor: CreateRefreshToken,
    ) -> DbResult<Option<RefreshTokenRow>>;

    /// Revoke every live token for a user, returning how many changed
    async fn revoke_all_for_user(&self, user_id: Uuid) -> DbResult<u64>;

    /// Delete expired and revoked tokens
    async fn delete_expired(&self) -> DbResult<u64>;
}

/// Create refresh token input
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

//! Refresh token and token pair types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Lifecycle state of a refresh token.
///
/// `Expired` and `Revoked` are terminal: nothing moves a token back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshTokenState {
    Active,
    Expired,
    Revoked,
}

impl std::fmt::Display for RefreshTokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Expired => write!(f, "expired"),
            Self::Revoked => write!(f, "revoked"),
        }
    }
}

/// Persisted refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Opaque token value (64 hex chars)
    pub token: String,
    /// User who owns the token
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Fixed at creation, never extended
    pub expires_at: DateTime<Utc>,
    /// Set once on revocation
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Check if the token has been revoked
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check if the token is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Lifecycle state at `now`. Revocation wins over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.is_revoked() {
            RefreshTokenState::Revoked
        } else if self.is_expired_at(now) {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    /// Lifecycle state right now
    pub fn state(&self) -> RefreshTokenState {
        self.state_at(Utc::now())
    }
}

/// A freshly minted refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access + refresh token pair returned after login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived, signed)
    pub access_token: String,
    /// Refresh token (long-lived, opaque)
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Refresh token expiry
    pub refresh_expires_at: DateTime<Utc>,
}

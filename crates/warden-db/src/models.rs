//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use warden_types::{RefreshTokenRecord, UserId, UserProfile};

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Refresh token row from the database
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRow {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Public projection (drops the password hash)
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id(),
            email: self.email.clone(),
            is_premium: self.is_premium,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl RefreshTokenRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }
}

impl From<RefreshTokenRow> for RefreshTokenRecord {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            user_id: UserId(row.user_id),
            token: row.token,
            created_at: row.created_at,
            updated_at: row.updated_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

//! Mock repositories for testing

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;
use uuid::Uuid;
use warden_db::{
    CreateRefreshToken, CreateUser, DbError, DbResult, RefreshTokenRepository, RefreshTokenRow,
    UserRepository, UserRow,
};

fn outage() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

/// In-memory user repository for testing
#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<DashMap<Uuid, UserRow>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test user directly
    pub fn insert_user(&self, user: UserRow) {
        self.by_email.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user);
    }

    /// Insert a user whose password hashes at bcrypt cost 4
    pub fn insert_with_password(&self, email: &str, password: &str) -> UserRow {
        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: bcrypt::hash(password, 4).unwrap(),
            is_premium: false,
            created_at: now,
            updated_at: now,
        };
        self.insert_user(row.clone());
        row
    }

    /// Stored row by id
    #[allow(dead_code)]
    pub fn get(&self, id: Uuid) -> Option<UserRow> {
        self.users.get(&id).map(|r| r.value().clone())
    }

    /// Stored row by email
    #[allow(dead_code)]
    pub fn get_by_email(&self, email: &str) -> Option<UserRow> {
        let id = *self.by_email.get(email)?.value();
        self.get(id)
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .by_email
            .get(email)
            .and_then(|id| self.users.get(id.value()).map(|r| r.value().clone())))
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        if self.by_email.contains_key(&user.email) {
            return Err(DbError::Conflict(format!("email {} exists", user.email)));
        }
        let now = Utc::now();
        let row = UserRow {
            id: user.id,
            email: user.email,
            hashed_password: user.hashed_password,
            is_premium: false,
            created_at: now,
            updated_at: now,
        };
        self.insert_user(row.clone());
        Ok(row)
    }

    async fn set_premium(&self, id: Uuid) -> DbResult<bool> {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.is_premium = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory refresh token repository for testing
#[derive(Default, Clone)]
pub struct MockRefreshTokenRepository {
    tokens: Arc<DashMap<String, RefreshTokenRow>>,
    unavailable: Arc<AtomicBool>,
}

impl MockRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the database were down
    #[allow(dead_code)]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> DbResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(outage())
        } else {
            Ok(())
        }
    }

    /// Insert a token row directly
    #[allow(dead_code)]
    pub fn insert_token(&self, row: RefreshTokenRow) {
        self.tokens.insert(row.token.clone(), row);
    }

    /// Insert a token that expired `ago` in the past
    #[allow(dead_code)]
    pub fn insert_expired(&self, token: &str, user_id: Uuid, ago: Duration) -> RefreshTokenRow {
        let expires_at = Utc::now() - ago;
        let created_at = expires_at - Duration::days(60);
        let row = RefreshTokenRow {
            token: token.to_string(),
            user_id,
            created_at,
            updated_at: created_at,
            expires_at,
            revoked_at: None,
        };
        self.insert_token(row.clone());
        row
    }

    /// Stored row by token value
    #[allow(dead_code)]
    pub fn get(&self, token: &str) -> Option<RefreshTokenRow> {
        self.tokens.get(token).map(|r| r.value().clone())
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn create(&self, token: CreateRefreshToken) -> DbResult<RefreshTokenRow> {
        self.check()?;
        if self.tokens.contains_key(&token.token) {
            return Err(DbError::Conflict("duplicate refresh token".to_string()));
        }
        let row = RefreshTokenRow {
            token: token.token,
            user_id: token.user_id,
            created_at: token.created_at,
            updated_at: token.updated_at,
            expires_at: token.expires_at,
            revoked_at: None,
        };
        self.insert_token(row.clone());
        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> DbResult<Option<RefreshTokenRow>> {
        self.check()?;
        Ok(self.get(token))
    }

    async fn revoke(&self, token: &str) -> DbResult<bool> {
        self.check()?;
        match self.tokens.get_mut(token) {
            Some(mut row) if row.revoked_at.is_none() => {
                let now = Utc::now();
                row.revoked_at = Some(now);
                row.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn rotate(
        &self,
        token: &str,
        successor: CreateRefreshToken,
    ) -> DbResult<Option<RefreshTokenRow>> {
        self.check()?;
        let now = successor.created_at;

        // The shard lock is held across check-and-set, like the row lock in Postgres
        let user_id = {
            let Some(mut row) = self.tokens.get_mut(token) else {
                return Ok(None);
            };
            if row.revoked_at.is_some() || row.expires_at <= now {
                return Ok(None);
            }
            row.revoked_at = Some(now);
            row.updated_at = now;
            row.user_id
        };

        let row = RefreshTokenRow {
            token: successor.token,
            user_id,
            created_at: successor.created_at,
            updated_at: successor.updated_at,
            expires_at: successor.expires_at,
            revoked_at: None,
        };
        self.insert_token(row.clone());
        Ok(Some(row))
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> DbResult<u64> {
        self.check()?;
        let now = Utc::now();
        let mut count = 0;
        for mut row in self.tokens.iter_mut() {
            if row.user_id == user_id && row.revoked_at.is_none() && row.expires_at > now {
                row.revoked_at = Some(now);
                row.updated_at = now;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        self.check()?;
        let now = Utc::now();
        let dead: Vec<String> = self
            .tokens
            .iter()
            .filter(|r| r.expires_at <= now || r.revoked_at.is_some())
            .map(|r| r.token.clone())
            .collect();
        let count = dead.len() as u64;
        for token in dead {
            self.tokens.remove(&token);
        }
        Ok(count)
    }
}

/// Refresh token repository whose lookups wait for each other.
///
/// Every `find_by_token` call parks on a shared barrier after reading, so
/// `parties` concurrent callers all observe the same state before any of
/// them writes.
#[derive(Clone)]
pub struct LockstepRefreshTokenRepository {
    inner: MockRefreshTokenRepository,
    barrier: Arc<Barrier>,
}

impl LockstepRefreshTokenRepository {
    #[allow(dead_code)]
    pub fn new(inner: MockRefreshTokenRepository, parties: usize) -> Self {
        Self {
            inner,
            barrier: Arc::new(Barrier::new(parties)),
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for LockstepRefreshTokenRepository {
    async fn create(&self, token: CreateRefreshToken) -> DbResult<RefreshTokenRow> {
        self.inner.create(token).await
    }

    async fn find_by_token(&self, token: &str) -> DbResult<Option<RefreshTokenRow>> {
        let row = self.inner.find_by_token(token).await;
        self.barrier.wait().await;
        row
    }

    async fn revoke(&self, token: &str) -> DbResult<bool> {
        self.inner.revoke(token).await
    }

    async fn rotate(
        &self,
        token: &str,
        successor: CreateRefreshToken,
    ) -> DbResult<Option<RefreshTokenRow>> {
        self.inner.rotate(token, successor).await
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> DbResult<u64> {
        self.inner.revoke_all_for_user(user_id).await
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        self.inner.delete_expired().await
    }
}

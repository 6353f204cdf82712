//! Application state

use std::ops::Deref;
use std::sync::Arc;

use warden_auth_core::SessionManager;
use warden_db::pg::{PgRefreshTokenRepository, PgUserRepository, Repositories};
use warden_db::DbPool;

use crate::config::Config;

/// Session manager over the Postgres repositories
pub type SessionManagerImpl = SessionManager<PgUserRepository, PgRefreshTokenRepository>;

/// Shared database pool wrapper for health checks
#[derive(Clone)]
pub struct SharedPool(Arc<DbPool>);

impl Deref for SharedPool {
    type Target = DbPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Login, refresh, revoke and authorization
    pub sessions: Arc<SessionManagerImpl>,
    /// Database connection pool (shared reference for health checks)
    pub pool: SharedPool,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state from config and a pool. Fails if the auth config is invalid.
    pub fn new(config: Config, pool: DbPool) -> Result<Self, warden_auth_core::AuthError> {
        let repos = Repositories::new(pool.clone());
        let sessions = SessionManager::new(
            config.auth.clone(),
            Arc::new(repos.users),
            Arc::new(repos.refresh_tokens),
        )?;

        Ok(Self {
            sessions: Arc::new(sessions),
            pool: SharedPool(Arc::new(pool)),
            config: Arc::new(config),
        })
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

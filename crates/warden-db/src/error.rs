//! Database errors

use thiserror::Error;

/// Postgres error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Unique constraint violated
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DbError {
    /// Map unique-constraint violations to `Conflict`, pass everything else through.
    pub fn from_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return Self::Conflict(db_err.message().to_string());
            }
        }
        Self::Sqlx(err)
    }
}

/// Result alias for repository operations
pub type DbResult<T> = Result<T, DbError>;

//! PostgreSQL refresh token repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::RefreshTokenRow;
use crate::repo::{CreateRefreshToken, RefreshTokenRepository};

/// PostgreSQL refresh token repository
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    /// Create a new refresh token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn create(&self, token: CreateRefreshToken) -> DbResult<RefreshTokenRow> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING token, user_id, created_at, updated_at, expires_at, revoked_at
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.created_at)
        .bind(token.updated_at)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from_insert)?;

        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> DbResult<Option<RefreshTokenRow>> {
        // State checks belong to the caller, so expired and revoked rows are returned too
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn revoke(&self, token: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW(), updated_at = NOW()
            WHERE token = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn rotate(
        &self,
        token: &str,
        successor: CreateRefreshToken,
    ) -> DbResult<Option<RefreshTokenRow>> {
        // A concurrent rotation blocks on the row lock, then re-checks
        // `revoked_at IS NULL` and matches nothing, so it inserts nothing.
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            WITH revoked AS (
                UPDATE refresh_tokens
                SET revoked_at = $3, updated_at = $3
                WHERE token = $1 AND revoked_at IS NULL AND expires_at > $3
                RETURNING user_id
            )
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at)
            SELECT $2, user_id, $3, $4, $5 FROM revoked
            RETURNING token, user_id, created_at, updated_at, expires_at, revoked_at
            "#,
        )
        .bind(token)
        .bind(&successor.token)
        .bind(successor.created_at)
        .bind(successor.updated_at)
        .bind(successor.expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from_insert)?;

        Ok(row)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW(), updated_at = NOW()
            WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > NOW()
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE expires_at < NOW() OR revoked_at IS NOT NULL",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

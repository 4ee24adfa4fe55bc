//! PostgreSQL implementation of RefreshTokenRepository

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, instrument};

use crafts_core::entities::RefreshToken;
use crafts_core::error::DomainError;
use crafts_core::traits::{RefreshTokenRepository, RepoResult};
use crafts_core::value_objects::Snowflake;

use crate::models::RefreshTokenModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of RefreshTokenRepository
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    /// Create a new PgRefreshTokenRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(executor: impl PgExecutor<'_>, token: &RefreshToken) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO refresh_tokens (id, user_id, token_hash, created_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(token.id.into_inner())
        .bind(token.user_id.into_inner())
        .bind(&token.token_hash)
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .execute(executor)
        .await
        .map_err(|e| {
            map_unique_violation(e, |_| {
                DomainError::InternalError("refresh token hash collision".to_string())
            })
        })?;

        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    #[instrument(skip(self, token), fields(token_id = %token.id, user_id = %token.user_id))]
    async fn create(&self, token: &RefreshToken) -> RepoResult<()> {
        Self::insert(&self.pool, token).await
    }

    #[instrument(skip_all)]
    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>> {
        let result = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            SELECT id, user_id, token_hash, created_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            ",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(RefreshToken::from))
    }

    #[instrument(skip(self, replacement), fields(new_token_id = %replacement.id))]
    async fn rotate(&self, old_id: Snowflake, replacement: &RefreshToken) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Compare-and-swap: only one concurrent redemption can flip revoked_at
        let revoked = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL AND expires_at > NOW()
            ",
        )
        .bind(old_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if revoked.rows_affected() == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            debug!("Refresh token was no longer active");
            return Ok(false);
        }

        Self::insert(&mut *tx, replacement).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(true)
    }

    #[instrument(skip(self))]
    async fn revoke(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE user_id = $1 AND revoked_at IS NULL
            ",
        )
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

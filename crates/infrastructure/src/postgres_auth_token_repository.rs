//! PostgreSQL-backed password reset token repository.

use async_trait::async_trait;
use sqlx::PgPool;

use tasklane_application::{AuthTokenRepository, PasswordResetTokenRecord};
use tasklane_core::{AppError, AppResult};
use tasklane_domain::UserId;

/// PostgreSQL implementation of the auth token repository port.
#[derive(Clone)]
pub struct PostgresAuthTokenRepository {
    pool: PgPool,
}

impl PostgresAuthTokenRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    email: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

impl From<TokenRow> for PasswordResetTokenRecord {
    fn from(row: TokenRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            email: row.email,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl AuthTokenRepository for PostgresAuthTokenRepository {
    async fn create_token(
        &self,
        user_id: UserId,
        email: &str,
        token_hash: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<uuid::Uuid> {
        let id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO password_reset_tokens (user_id, email, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(email)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create reset token: {error}")))?;

        Ok(id)
    }

    async fn consume_valid_token(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<PasswordResetTokenRecord>> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            UPDATE password_reset_tokens
            SET used_at = now()
            WHERE token_hash = $1
              AND used_at IS NULL
              AND expires_at > now()
            RETURNING id, user_id, email, expires_at
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to consume reset token: {error}")))?;

        Ok(row.map(PasswordResetTokenRecord::from))
    }

    async fn invalidate_tokens_for_user(&self, user_id: UserId) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET used_at = now()
            WHERE user_id = $1
              AND used_at IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to invalidate tokens: {error}")))?;

        Ok(())
    }

    async fn count_recent_tokens(
        &self,
        email: &str,
        since: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM password_reset_tokens
            WHERE LOWER(email) = LOWER($1)
              AND created_at >= $2
            "#,
        )
        .bind(email)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count recent tokens: {error}")))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests;

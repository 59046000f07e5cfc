use async_trait::async_trait;
use sqlx::PgPool;

use tasklane_application::AuthorizationRepository;
use tasklane_core::{AppError, AppResult, TenantId};
use tasklane_domain::{Principal, Role, UserId};

use crate::postgres_role_repository::{ROLE_SELECT, RoleRow};

/// PostgreSQL-backed authorization repository.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn find_principal(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Option<Principal>> {
        let is_active = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT is_active
            FROM users
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user status: {error}")))?;

        let Some(is_active) = is_active else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            r#"
            {ROLE_SELECT}
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE r.tenant_id = $1 AND ur.user_id = $2
            GROUP BY r.id, r.name
            ORDER BY r.name
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load roles for principal: {error}"))
        })?;

        let roles = rows
            .into_iter()
            .map(Role::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Some(Principal::new(user_id, is_active, roles)))
    }
}

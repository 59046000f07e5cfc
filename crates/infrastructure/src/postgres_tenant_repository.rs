use async_trait::async_trait;
use sqlx::PgPool;

use tasklane_application::TenantRepository;
use tasklane_core::{AppError, AppResult, TenantId};

/// PostgreSQL-backed tenant repository.
#[derive(Clone)]
pub struct PostgresTenantRepository {
    pool: PgPool,
}

impl PostgresTenantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepository {
    async fn create_tenant(&self, name: &str) -> AppResult<TenantId> {
        let tenant_id = TenantId::new();

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name)
            VALUES ($1, $2)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create tenant: {error}")))?;

        Ok(tenant_id)
    }
}

//! PostgreSQL-backed role repository.
//!
//! Every role stores one explicit `granted` flag per catalog permission.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use tasklane_application::RoleRepository;
use tasklane_core::{AppError, AppResult, TenantId};
use tasklane_domain::{Capability, CapabilitySet, Role, RoleId};

use crate::postgres_errors::conflict_or_internal;

/// PostgreSQL implementation of the role repository port.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    id: uuid::Uuid,
    name: String,
    granted_permissions: Vec<String>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let capabilities = row
            .granted_permissions
            .iter()
            .map(|name| {
                Capability::parse(name).map_err(|error| {
                    AppError::Internal(format!("role '{}' stores {error}", row.id))
                })
            })
            .collect::<AppResult<CapabilitySet>>()?;

        Role::new(RoleId::from_uuid(row.id), row.name, capabilities)
    }
}

/// Selects roles with their granted permission names aggregated per row.
pub(crate) const ROLE_SELECT: &str = r#"
    SELECT
        r.id,
        r.name,
        COALESCE(
            array_agg(rp.permission_name ORDER BY rp.permission_name)
                FILTER (WHERE rp.granted),
            '{}'
        ) AS granted_permissions
    FROM roles r
    LEFT JOIN role_permissions rp ON rp.role_id = r.id
"#;

async fn write_permission_flags(
    transaction: &mut Transaction<'_, Postgres>,
    role: &Role,
) -> AppResult<()> {
    let (names, granted): (Vec<String>, Vec<bool>) = role
        .flags()
        .into_iter()
        .map(|(capability, granted)| (capability.permission_name(), granted))
        .unzip();

    sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission_name, granted)
        SELECT $1, flags.name, flags.granted
        FROM UNNEST($2::TEXT[], $3::BOOLEAN[]) AS flags(name, granted)
        ON CONFLICT (role_id, permission_name)
        DO UPDATE SET granted = EXCLUDED.granted
        "#,
    )
    .bind(role.id().as_uuid())
    .bind(names)
    .bind(granted)
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to write role permissions: {error}")))?;

    Ok(())
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, tenant_id: TenantId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "{ROLE_SELECT} WHERE r.tenant_id = $1 GROUP BY r.id, r.name ORDER BY r.name"
        ))
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn find_role(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "{ROLE_SELECT} WHERE r.tenant_id = $1 AND r.id = $2 GROUP BY r.id, r.name"
        ))
        .bind(tenant_id.as_uuid())
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        row.map(Role::try_from).transpose()
    }

    async fn create_role(&self, tenant_id: TenantId, role: &Role) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO roles (id, tenant_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(role.name().as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                "create role",
                &format!("role '{}' already exists", role.name()),
            )
        })?;

        write_permission_flags(&mut transaction, role).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit role creation: {error}"))
        })?;

        Ok(())
    }

    async fn update_role(&self, tenant_id: TenantId, role: &Role) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let updated = sqlx::query(
            r#"
            UPDATE roles
            SET name = $3
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                "update role",
                &format!("role '{}' already exists", role.name()),
            )
        })?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                role.id()
            )));
        }

        write_permission_flags(&mut transaction, role).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit role update: {error}"))
        })?;

        Ok(())
    }

    async fn delete_role(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM roles
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                "delete role",
                &format!("role '{role_id}' is still assigned to users"),
            )
        })?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn count_role_holders(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE r.tenant_id = $1 AND r.id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(role_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count role holders: {error}")))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn ensure_permission_catalog(&self, catalog: &[Capability]) -> AppResult<()> {
        let (names, descriptions): (Vec<String>, Vec<&str>) = catalog
            .iter()
            .map(|capability| (capability.permission_name(), capability.description()))
            .unzip();

        sqlx::query(
            r#"
            INSERT INTO permissions (name, description)
            SELECT entries.name, entries.description
            FROM UNNEST($1::TEXT[], $2::TEXT[]) AS entries(name, description)
            ON CONFLICT (name)
            DO UPDATE SET description = EXCLUDED.description
            "#,
        )
        .bind(names)
        .bind(descriptions)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to register permission catalog: {error}"))
        })?;

        Ok(())
    }
}

//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use tasklane_application::{NewUser, UserRecord, UserRepository};
use tasklane_core::{AppError, AppResult, TenantId};
use tasklane_domain::{RoleId, UserId};

use crate::postgres_errors::conflict_or_internal;

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    email: String,
    display_name: String,
    password_hash: String,
    is_active: bool,
    role_ids: Vec<uuid::Uuid>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            email: row.email,
            display_name: row.display_name,
            password_hash: row.password_hash,
            is_active: row.is_active,
            role_ids: row.role_ids.into_iter().map(RoleId::from_uuid).collect(),
        }
    }
}

const USER_SELECT: &str = r#"
    SELECT
        u.id,
        u.tenant_id,
        u.email,
        u.display_name,
        u.password_hash,
        u.is_active,
        COALESCE(
            array_agg(ur.role_id ORDER BY ur.assigned_at) FILTER (WHERE ur.role_id IS NOT NULL),
            '{}'
        ) AS role_ids
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.id
"#;

mod account;
mod lookup;
mod membership;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn count_users(&self) -> AppResult<u64> {
        self.count_users_impl().await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        self.find_by_email_impl(email).await
    }

    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Option<UserRecord>> {
        self.find_by_id_impl(tenant_id, user_id).await
    }

    async fn list_users(&self, tenant_id: TenantId) -> AppResult<Vec<UserRecord>> {
        self.list_users_impl(tenant_id).await
    }

    async fn create_user(&self, user: NewUser, role_ids: &[RoleId]) -> AppResult<UserRecord> {
        self.create_user_impl(user, role_ids).await
    }

    async fn update_profile(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        display_name: &str,
        is_active: bool,
    ) -> AppResult<UserRecord> {
        self.update_profile_impl(tenant_id, user_id, display_name, is_active)
            .await
    }

    async fn delete_user(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<()> {
        self.delete_user_impl(tenant_id, user_id).await
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        self.update_password_impl(user_id, password_hash).await
    }

    async fn assign_role(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        self.assign_role_impl(tenant_id, user_id, role_id).await
    }

    async fn unassign_role(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        self.unassign_role_impl(tenant_id, user_id, role_id).await
    }
}

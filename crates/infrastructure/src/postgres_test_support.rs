//! Database fixtures for PostgreSQL adapter tests.
//!
//! Tests return early when `DATABASE_URL` is not set.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tasklane_core::TenantId;
use tasklane_domain::{Capability, UserId};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tests: {error}");
    }

    let catalog = Capability::all()
        .iter()
        .map(Capability::permission_name)
        .collect::<Vec<_>>();
    let seeded = sqlx::query(
        r#"
        INSERT INTO permissions (name)
        SELECT UNNEST($1::TEXT[])
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(catalog)
    .execute(&pool)
    .await;
    assert!(seeded.is_ok());

    Some(pool)
}

pub(crate) async fn ensure_tenant(pool: &PgPool, name: &str) -> TenantId {
    let tenant_id = TenantId::new();
    let insert = sqlx::query(
        r#"
        INSERT INTO tenants (id, name)
        VALUES ($1, $2)
        "#,
    )
    .bind(tenant_id.as_uuid())
    .bind(name)
    .execute(pool)
    .await;
    assert!(insert.is_ok());

    tenant_id
}

pub(crate) async fn insert_user(pool: &PgPool, tenant_id: TenantId, is_active: bool) -> UserId {
    let user_id = UserId::new();
    let insert = sqlx::query(
        r#"
        INSERT INTO users (id, tenant_id, email, display_name, password_hash, is_active)
        VALUES ($1, $2, $3, 'Test User', 'hash', $4)
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(tenant_id.as_uuid())
    .bind(format!("{user_id}@example.com"))
    .bind(is_active)
    .execute(pool)
    .await;
    assert!(insert.is_ok());

    user_id
}

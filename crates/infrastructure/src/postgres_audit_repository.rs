use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use tasklane_application::{AuditEvent, AuditRepository};
use tasklane_core::{AppError, AppResult};

/// Longest detail text kept per audit row, in characters.
const DETAIL_MAX_CHARS: usize = 1024;

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let detail = stored_detail(event.detail);

        let event_id: uuid::Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO audit_log_entries (
                tenant_id, subject, action, resource_type, resource_id, detail
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(event.tenant_id.as_uuid())
        .bind(&event.subject)
        .bind(event.action.as_str())
        .bind(&event.resource_type)
        .bind(&event.resource_id)
        .bind(detail)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to record {} on {} {}: {error}",
                event.action.as_str(),
                event.resource_type,
                event.resource_id
            ))
        })?;

        debug!(
            %event_id,
            action = event.action.as_str(),
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            "audit event recorded"
        );
        Ok(())
    }
}

/// Blank details are stored as NULL; long ones are cut at a character boundary.
pub(crate) fn stored_detail(detail: Option<String>) -> Option<String> {
    let detail = detail?;
    let trimmed = detail.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(trimmed.chars().take(DETAIL_MAX_CHARS).collect())
}

use std::sync::Arc;

use async_trait::async_trait;

use tasklane_core::{AppError, AppResult, TenantId, UserIdentity};
use tasklane_domain::{AuditAction, Capability};

use crate::AuthorizationService;

/// Largest page the audit log listing returns.
pub const AUDIT_LOG_MAX_LIMIT: usize = 200;

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Tenant scope for the event.
    pub tenant_id: TenantId,
    /// Subject that performed the action.
    pub subject: String,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

impl AuditEvent {
    /// Builds an event attributed to the signed-in actor.
    #[must_use]
    pub fn by_actor(
        actor: &UserIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            tenant_id: actor.tenant_id(),
            subject: actor.subject().to_owned(),
            action,
            resource_type: resource_type.to_owned(),
            resource_id: resource_id.into(),
            detail,
        }
    }
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Audit log entry projection for administrative views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Stable event identifier.
    pub event_id: String,
    /// Actor subject.
    pub subject: String,
    /// Stable action identifier.
    pub action: String,
    /// Event resource type.
    pub resource_type: String,
    /// Event resource identifier.
    pub resource_id: String,
    /// Optional event detail.
    pub detail: Option<String>,
    /// Event timestamp in RFC3339.
    pub created_at: String,
}

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional action filter.
    pub action: Option<String>,
    /// Optional subject filter.
    pub subject: Option<String>,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            action: None,
            subject: None,
        }
    }
}

/// Repository port for reading tenant audit logs.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Lists most recent tenant audit entries, newest first.
    async fn list_recent_entries(
        &self,
        tenant_id: TenantId,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>>;
}

/// Application service for reading the tenant audit log.
#[derive(Clone)]
pub struct AuditLogService {
    authorization_service: AuthorizationService,
    audit_log_repository: Arc<dyn AuditLogRepository>,
}

impl AuditLogService {
    /// Creates a new audit log service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        audit_log_repository: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            authorization_service,
            audit_log_repository,
        }
    }

    /// Returns recent audit entries for user administrators.
    pub async fn list(
        &self,
        actor: &UserIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.authorization_service
            .require_capability(actor, Capability::ReadUsers)
            .await?;

        if query.limit == 0 || query.limit > AUDIT_LOG_MAX_LIMIT {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {AUDIT_LOG_MAX_LIMIT}"
            )));
        }

        self.audit_log_repository
            .list_recent_entries(actor.tenant_id(), query)
            .await
    }
}

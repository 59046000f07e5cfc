//! In-memory implementation of every persistence port.
//!
//! Mirrors the PostgreSQL adapters' constraint behavior: unique emails,
//! unique role names per tenant, role deletion blocked while held, and
//! tasks detached when their project is removed.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tasklane_application::{
    AUDIT_LOG_MAX_LIMIT, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditRepository, AuthTokenRepository, AuthorizationRepository, NewUser,
    PasswordResetTokenRecord, ProjectRepository, RoleRepository, TaskQuery, TaskRepository,
    TenantRepository, UserRecord, UserRepository,
};
use tasklane_core::{AppError, AppResult, TenantId};
use tasklane_domain::{
    Capability, Principal, Project, ProjectId, Role, RoleId, Task, TaskId, UserId,
};
use tokio::sync::RwLock;

use crate::postgres_audit_repository::stored_detail;

mod directory;
mod records;
mod tokens;

#[derive(Debug, Clone)]
struct StoredAuditEvent {
    id: uuid::Uuid,
    event: AuditEvent,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
struct StoredToken {
    record: PasswordResetTokenRecord,
    token_hash: String,
    used: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// In-memory store implementing all repository ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tenants: RwLock<HashMap<TenantId, String>>,
    users: RwLock<HashMap<UserId, UserRecord>>,
    roles: RwLock<HashMap<RoleId, (TenantId, Role)>>,
    permissions: RwLock<BTreeMap<String, String>>,
    projects: RwLock<HashMap<ProjectId, (TenantId, Project)>>,
    tasks: RwLock<Vec<(TenantId, Task)>>,
    audit_events: RwLock<Vec<StoredAuditEvent>>,
    tokens: RwLock<Vec<StoredToken>>,
}

impl InMemoryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registered permission names in sorted order.
    pub async fn permission_names(&self) -> Vec<String> {
        self.permissions.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl AuditRepository for InMemoryStore {
    async fn append_event(&self, mut event: AuditEvent) -> AppResult<()> {
        event.detail = stored_detail(event.detail);
        self.audit_events.write().await.push(StoredAuditEvent {
            id: uuid::Uuid::new_v4(),
            event,
            created_at: chrono::Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryStore {
    async fn list_recent_entries(
        &self,
        tenant_id: TenantId,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        let events = self.audit_events.read().await;

        Ok(events
            .iter()
            .rev()
            .filter(|stored| stored.event.tenant_id == tenant_id)
            .filter(|stored| {
                query
                    .action
                    .as_deref()
                    .is_none_or(|action| stored.event.action.as_str() == action)
            })
            .filter(|stored| {
                query
                    .subject
                    .as_deref()
                    .is_none_or(|subject| stored.event.subject == subject)
            })
            .skip(query.offset)
            .take(query.limit.clamp(1, AUDIT_LOG_MAX_LIMIT))
            .map(|stored| AuditLogEntry {
                event_id: stored.id.to_string(),
                subject: stored.event.subject.clone(),
                action: stored.event.action.as_str().to_owned(),
                resource_type: stored.event.resource_type.clone(),
                resource_id: stored.event.resource_id.clone(),
                detail: stored.event.detail.clone(),
                created_at: stored
                    .created_at
                    .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            })
            .collect())
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use tasklane_core::{AppError, AppResult, TenantId, UserIdentity};
use tasklane_domain::{AuditAction, Capability, CapabilitySet, Role, RoleId, permission_registry};

use crate::{AuditEvent, AuditRepository, AuthorizationService};

/// Repository port for role and permission catalog persistence.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists tenant roles ordered by name.
    async fn list_roles(&self, tenant_id: TenantId) -> AppResult<Vec<Role>>;

    /// Finds one tenant role.
    async fn find_role(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Creates a role. Fails with `Conflict` when the name is taken.
    async fn create_role(&self, tenant_id: TenantId, role: &Role) -> AppResult<()>;

    /// Replaces a role's name and capability flags.
    async fn update_role(&self, tenant_id: TenantId, role: &Role) -> AppResult<()>;

    /// Deletes a role.
    async fn delete_role(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<()>;

    /// Counts users holding the role.
    async fn count_role_holders(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<u64>;

    /// Inserts missing permission catalog rows.
    async fn ensure_permission_catalog(&self, catalog: &[Capability]) -> AppResult<()>;
}

/// Input payload for creating or replacing a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInput {
    /// Unique role name in tenant scope.
    pub name: String,
    /// Granted capabilities; everything else is denied.
    pub capabilities: CapabilitySet,
}

/// Application service for role administration.
#[derive(Clone)]
pub struct RoleService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn RoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleService {
    /// Creates a new role service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn RoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
        }
    }

    /// Seeds the permission catalog. Safe to run on every startup.
    pub async fn ensure_permission_catalog(&self) -> AppResult<()> {
        self.repository
            .ensure_permission_catalog(permission_registry::catalog())
            .await
    }

    /// Returns tenant roles.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<Role>> {
        self.authorization_service
            .require_capability(actor, Capability::ReadUsers)
            .await?;

        self.repository.list_roles(actor.tenant_id()).await
    }

    /// Creates a role and emits an audit event.
    pub async fn create_role(&self, actor: &UserIdentity, input: RoleInput) -> AppResult<Role> {
        self.authorization_service
            .require_capability(actor, Capability::CreateUsers)
            .await?;

        let role = Role::new(RoleId::new(), input.name, input.capabilities)?;
        self.repository.create_role(actor.tenant_id(), &role).await?;

        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                AuditAction::RoleCreated,
                "role",
                role.id().to_string(),
                Some(describe_role(&role)),
            ))
            .await?;

        Ok(role)
    }

    /// Renames a role and replaces its capability flags.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        input: RoleInput,
    ) -> AppResult<Role> {
        self.authorization_service
            .require_capability(actor, Capability::EditUsers)
            .await?;

        let mut role = self.find_role(actor, role_id).await?;
        role.rename(input.name)?;
        role.replace_capabilities(input.capabilities);
        self.repository.update_role(actor.tenant_id(), &role).await?;

        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                AuditAction::RoleUpdated,
                "role",
                role.id().to_string(),
                Some(describe_role(&role)),
            ))
            .await?;

        Ok(role)
    }

    /// Deletes a role no user holds.
    pub async fn delete_role(&self, actor: &UserIdentity, role_id: RoleId) -> AppResult<()> {
        self.authorization_service
            .require_capability(actor, Capability::DeleteUsers)
            .await?;

        let role = self.find_role(actor, role_id).await?;
        let holders = self
            .repository
            .count_role_holders(actor.tenant_id(), role_id)
            .await?;
        if holders > 0 {
            return Err(AppError::Conflict(format!(
                "role '{}' is still assigned to {holders} user(s)",
                role.name()
            )));
        }

        self.repository
            .delete_role(actor.tenant_id(), role_id)
            .await?;

        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                AuditAction::RoleDeleted,
                "role",
                role_id.to_string(),
                Some(format!("deleted role '{}'", role.name())),
            ))
            .await
    }

    async fn find_role(&self, actor: &UserIdentity, role_id: RoleId) -> AppResult<Role> {
        self.repository
            .find_role(actor.tenant_id(), role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }
}

fn describe_role(role: &Role) -> String {
    let granted = role
        .capabilities()
        .iter()
        .map(|capability| capability.as_str())
        .collect::<Vec<_>>();
    format!("role '{}' grants [{}]", role.name(), granted.join(", "))
}

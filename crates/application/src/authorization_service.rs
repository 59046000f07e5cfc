use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tasklane_core::{AppError, AppResult, TenantId, UserIdentity};
use tasklane_domain::permission_registry;
use tasklane_domain::task_policy::{self, TaskAction, TaskTarget};
use tasklane_domain::{AccessDecision, Capability, DenyReason, Principal, UserId};

/// Repository port for loading authorization snapshots.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Loads the user's active flag and assigned roles in tenant scope.
    async fn find_principal(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Option<Principal>>;
}

/// Application service for tenant-scoped authorization checks.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Loads the actor's principal, rejecting unknown and inactive accounts.
    pub async fn resolve_principal(&self, actor: &UserIdentity) -> AppResult<Principal> {
        let principal = self
            .find_principal(actor)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown account".to_owned()))?;

        if !principal.is_active() {
            return Err(AppError::Forbidden("account is inactive".to_owned()));
        }

        Ok(principal)
    }

    /// Returns the actor's capability map with every catalog entry present.
    pub async fn effective_capabilities(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<BTreeMap<Capability, bool>> {
        let principal = self.resolve_principal(actor).await?;
        Ok(permission_registry::resolve(&principal))
    }

    /// Generic capability gate addressed by name.
    ///
    /// Fails closed: unknown accounts, inactive accounts and names outside
    /// the catalog all yield `false`.
    pub async fn authorize(&self, actor: &UserIdentity, capability_name: &str) -> AppResult<bool> {
        let Some(principal) = self.find_principal(actor).await? else {
            return Ok(false);
        };

        match permission_registry::authorize(&principal, capability_name) {
            AccessDecision::Granted => Ok(true),
            AccessDecision::Denied(DenyReason::UnknownCapability(error)) => {
                tracing::warn!(
                    subject = actor.subject(),
                    tenant_id = %actor.tenant_id(),
                    capability = %error.name,
                    "denying lookup of unknown capability"
                );
                Ok(false)
            }
            AccessDecision::Denied(_) => Ok(false),
        }
    }

    /// Strict capability lookup addressed by name.
    ///
    /// Names outside the catalog surface as validation errors; inactive
    /// accounts hold no capabilities.
    pub async fn has_capability(
        &self,
        actor: &UserIdentity,
        capability_name: &str,
    ) -> AppResult<bool> {
        let principal = self
            .find_principal(actor)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown account".to_owned()))?;

        let granted = permission_registry::has(&principal, capability_name)?;
        Ok(granted && principal.is_active())
    }

    /// Ensures the actor holds a capability and returns its principal.
    pub async fn require_capability(
        &self,
        actor: &UserIdentity,
        capability: Capability,
    ) -> AppResult<Principal> {
        let principal = self.resolve_principal(actor).await?;

        if !permission_registry::has_capability(&principal, capability) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' is missing capability '{}' in tenant '{}'",
                actor.subject(),
                capability.as_str(),
                actor.tenant_id()
            )));
        }

        Ok(principal)
    }

    /// Returns whether the principal may perform the task action.
    #[must_use]
    pub fn can_perform_task_action(
        &self,
        principal: &Principal,
        action: TaskAction,
        target: Option<&TaskTarget<'_>>,
    ) -> bool {
        task_policy::decide(action, Some(principal), target)
    }

    /// Ensures the principal may perform the task action.
    pub fn require_task_action(
        &self,
        principal: &Principal,
        action: TaskAction,
        target: Option<&TaskTarget<'_>>,
    ) -> AppResult<()> {
        if self.can_perform_task_action(principal, action, target) {
            return Ok(());
        }

        let resource = target
            .map(|target| format!("task '{}'", target.task().id()))
            .unwrap_or_else(|| "tasks".to_owned());
        Err(AppError::Forbidden(format!(
            "user '{}' may not {action} {resource}",
            principal.user_id()
        )))
    }

    async fn find_principal(&self, actor: &UserIdentity) -> AppResult<Option<Principal>> {
        let user_id = actor_user_id(actor)?;
        self.repository
            .find_principal(actor.tenant_id(), user_id)
            .await
    }
}

/// Parses the session subject into a user identifier.
pub(crate) fn actor_user_id(actor: &UserIdentity) -> AppResult<UserId> {
    actor
        .subject()
        .parse::<UserId>()
        .map_err(|_| AppError::Unauthorized("session subject is not a user id".to_owned()))
}

#[cfg(test)]
mod tests;

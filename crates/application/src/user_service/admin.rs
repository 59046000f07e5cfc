use tasklane_core::{AppError, NonEmptyString, UserIdentity};
use tasklane_domain::{
    AuditAction, Capability, EmailAddress, Role, RoleId, UserId, validate_password,
};

use crate::AuditEvent;

use super::*;

impl UserService {
    /// Creates a user account with optional initial roles.
    pub async fn create_user(
        &self,
        actor: &UserIdentity,
        input: CreateUserInput,
    ) -> AppResult<UserRecord> {
        self.authorization_service
            .require_capability(actor, Capability::CreateUsers)
            .await?;

        let email = EmailAddress::new(&input.email)?;
        let display_name = NonEmptyString::new(input.display_name)?;
        validate_password(&input.password)?;

        let mut role_ids = input.role_ids;
        role_ids.sort();
        role_ids.dedup();
        for role_id in &role_ids {
            self.require_role(actor, *role_id).await?;
        }

        let password_hash = self.password_hasher.hash_password(&input.password)?;
        let user = self
            .user_repository
            .create_user(
                NewUser {
                    id: UserId::new(),
                    tenant_id: actor.tenant_id(),
                    email: email.as_str().to_owned(),
                    display_name: display_name.as_str().to_owned(),
                    password_hash,
                    is_active: true,
                },
                &role_ids,
            )
            .await?;

        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                AuditAction::UserCreated,
                "user",
                user.id.to_string(),
                Some(format!("created user '{}'", user.email)),
            ))
            .await?;

        Ok(user)
    }

    /// Lists tenant users.
    pub async fn list_users(&self, actor: &UserIdentity) -> AppResult<Vec<UserRecord>> {
        self.authorization_service
            .require_capability(actor, Capability::ReadUsers)
            .await?;

        self.user_repository.list_users(actor.tenant_id()).await
    }

    /// Returns one user. Users may always read their own account.
    pub async fn get_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<UserRecord> {
        let principal = self.authorization_service.resolve_principal(actor).await?;
        if principal.user_id() != user_id {
            self.authorization_service
                .require_capability(actor, Capability::ReadUsers)
                .await?;
        }

        self.find_user(actor, user_id).await
    }

    /// Updates display name and active flag.
    pub async fn update_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<UserRecord> {
        let principal = self
            .authorization_service
            .require_capability(actor, Capability::EditUsers)
            .await?;

        let display_name = NonEmptyString::new(input.display_name)?;
        if principal.user_id() == user_id && !input.is_active {
            return Err(AppError::Conflict(
                "users cannot deactivate their own account".to_owned(),
            ));
        }

        let user = self
            .user_repository
            .update_profile(
                actor.tenant_id(),
                user_id,
                display_name.as_str(),
                input.is_active,
            )
            .await?;

        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                AuditAction::UserUpdated,
                "user",
                user.id.to_string(),
                Some(format!(
                    "updated user '{}' (active: {})",
                    user.email, user.is_active
                )),
            ))
            .await?;

        Ok(user)
    }

    /// Deletes a user account other than the actor's own.
    pub async fn delete_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<()> {
        let principal = self
            .authorization_service
            .require_capability(actor, Capability::DeleteUsers)
            .await?;

        if principal.user_id() == user_id {
            return Err(AppError::Conflict(
                "users cannot delete their own account".to_owned(),
            ));
        }

        let user = self.find_user(actor, user_id).await?;
        self.user_repository
            .delete_user(actor.tenant_id(), user_id)
            .await?;

        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                AuditAction::UserDeleted,
                "user",
                user_id.to_string(),
                Some(format!("deleted user '{}'", user.email)),
            ))
            .await
    }

    /// Grants a role to a user.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<UserRecord> {
        self.authorization_service
            .require_capability(actor, Capability::EditUsers)
            .await?;

        self.find_user(actor, user_id).await?;
        let role = self.require_role(actor, role_id).await?;

        self.user_repository
            .assign_role(actor.tenant_id(), user_id, role_id)
            .await?;

        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                AuditAction::UserRoleAssigned,
                "user_role",
                format!("{user_id}:{role_id}"),
                Some(format!("assigned role '{}'", role.name())),
            ))
            .await?;

        self.find_user(actor, user_id).await
    }

    /// Removes a role from a user.
    pub async fn unassign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<UserRecord> {
        self.authorization_service
            .require_capability(actor, Capability::EditUsers)
            .await?;

        self.find_user(actor, user_id).await?;
        self.user_repository
            .unassign_role(actor.tenant_id(), user_id, role_id)
            .await?;

        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                AuditAction::UserRoleUnassigned,
                "user_role",
                format!("{user_id}:{role_id}"),
                None,
            ))
            .await?;

        self.find_user(actor, user_id).await
    }

    async fn find_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<UserRecord> {
        self.user_repository
            .find_by_id(actor.tenant_id(), user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    async fn require_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<Role> {
        self.role_repository
            .find_role(actor.tenant_id(), role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }
}

use tasklane_core::{AppError, NonEmptyString, UserIdentity};
use tasklane_domain::{
    AuditAction, CapabilitySet, EmailAddress, Role, RoleId, UserId, validate_password,
};

use crate::AuditEvent;
use crate::authorization_service::actor_user_id;

use super::*;

impl UserService {
    /// Creates the first tenant, its administrator role and administrator.
    ///
    /// Only allowed while no user account exists anywhere.
    pub async fn bootstrap_administrator(
        &self,
        input: BootstrapAdministratorInput,
    ) -> AppResult<UserRecord> {
        if self.user_repository.count_users().await? > 0 {
            return Err(AppError::Conflict(
                "an administrator has already been bootstrapped".to_owned(),
            ));
        }

        let email = EmailAddress::new(&input.email)?;
        validate_password(&input.password)?;
        let tenant_name = NonEmptyString::new(input.tenant_name)?;
        let display_name = NonEmptyString::new(input.display_name)?;

        let tenant_id = self
            .tenant_repository
            .create_tenant(tenant_name.as_str())
            .await?;

        let role = Role::new(RoleId::new(), ADMINISTRATOR_ROLE_NAME, CapabilitySet::all())?;
        self.role_repository.create_role(tenant_id, &role).await?;

        let password_hash = self.password_hasher.hash_password(&input.password)?;
        let user = self
            .user_repository
            .create_user(
                NewUser {
                    id: UserId::new(),
                    tenant_id,
                    email: email.as_str().to_owned(),
                    display_name: display_name.as_str().to_owned(),
                    password_hash,
                    is_active: true,
                },
                &[role.id()],
            )
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                tenant_id,
                subject: user.id.to_string(),
                action: AuditAction::TenantBootstrapped,
                resource_type: "tenant".to_owned(),
                resource_id: tenant_id.to_string(),
                detail: Some(format!(
                    "bootstrapped tenant '{tenant_name}' with administrator '{}'",
                    user.email
                )),
            })
            .await?;

        tracing::info!(tenant_id = %tenant_id, user_id = %user.id, "bootstrapped administrator");
        Ok(user)
    }

    /// Authenticates a user with email and password.
    ///
    /// Unknown emails, wrong passwords and inactive accounts all return
    /// `AuthOutcome::Failed`.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let user = match EmailAddress::new(email) {
            Ok(email) => self.user_repository.find_by_email(email.as_str()).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        let password_valid = self
            .password_hasher
            .verify_password(password, &user.password_hash)?;

        if !password_valid || !user.is_active {
            tracing::info!(user_id = %user.id, "rejected login attempt");
            return Ok(AuthOutcome::Failed);
        }

        Ok(AuthOutcome::Authenticated(user))
    }

    /// Changes the password of the signed-in user.
    ///
    /// Requires the current password.
    pub async fn change_password(
        &self,
        actor: &UserIdentity,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let principal = self.authorization_service.resolve_principal(actor).await?;
        let user = self
            .user_repository
            .find_by_id(actor.tenant_id(), principal.user_id())
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

        let current_valid = self
            .password_hasher
            .verify_password(current_password, &user.password_hash)?;

        if !current_valid {
            return Err(AppError::Unauthorized(
                "current password is incorrect".to_owned(),
            ));
        }

        validate_password(new_password)?;

        let new_hash = self.password_hasher.hash_password(new_password)?;
        self.user_repository
            .update_password(user.id, &new_hash)
            .await?;

        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                AuditAction::UserPasswordChanged,
                "user",
                user.id.to_string(),
                None,
            ))
            .await
    }

    /// Builds the session identity for an authenticated user.
    #[must_use]
    pub fn session_identity(user: &UserRecord) -> UserIdentity {
        UserIdentity::new(
            user.id.to_string(),
            user.display_name.clone(),
            Some(user.email.clone()),
            user.tenant_id,
        )
    }

    /// Returns the signed-in user's own record.
    pub async fn current_user(&self, actor: &UserIdentity) -> AppResult<UserRecord> {
        let user_id = actor_user_id(actor)?;
        self.user_repository
            .find_by_id(actor.tenant_id(), user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown account".to_owned()))
    }
}

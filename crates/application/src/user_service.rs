//! User management ports and application service.
//!
//! Owns the user lifecycle: first-administrator bootstrap, administration
//! of accounts and role memberships, authentication and password changes.
//! Login failures use one generic outcome and always spend a hash.

use std::sync::Arc;

use async_trait::async_trait;

use tasklane_core::{AppResult, TenantId};
use tasklane_domain::{RoleId, UserId};

use crate::{AuditRepository, AuthorizationService, RoleRepository};

mod admin;
mod authentication;

/// User record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Tenant the account belongs to.
    pub tenant_id: TenantId,
    /// Canonical lowercase email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Inactive accounts are denied every action.
    pub is_active: bool,
    /// Assigned roles.
    pub role_ids: Vec<RoleId>,
}

/// Account fields persisted on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Identifier chosen by the service.
    pub id: UserId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Canonical lowercase email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Initial active flag.
    pub is_active: bool,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Counts user accounts across all tenants.
    async fn count_users(&self) -> AppResult<u64>;

    /// Finds a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by identifier in tenant scope.
    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Option<UserRecord>>;

    /// Lists tenant users ordered by email.
    async fn list_users(&self, tenant_id: TenantId) -> AppResult<Vec<UserRecord>>;

    /// Creates a user with its initial role memberships.
    ///
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, user: NewUser, role_ids: &[RoleId]) -> AppResult<UserRecord>;

    /// Updates display name and active flag.
    async fn update_profile(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        display_name: &str,
        is_active: bool,
    ) -> AppResult<UserRecord>;

    /// Deletes a user and its role memberships.
    async fn delete_user(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<()>;

    /// Updates the password hash for a user.
    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()>;

    /// Adds a role membership; already held roles are left as is.
    async fn assign_role(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()>;

    /// Removes a role membership; missing memberships are ignored.
    async fn unassign_role(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()>;
}

/// Port for tenant provisioning.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Creates a tenant and returns its identifier.
    async fn create_tenant(&self, name: &str) -> AppResult<TenantId>;
}

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password using Argon2id.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Result of a login attempt.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Authentication succeeded. Session can be established.
    Authenticated(UserRecord),
    /// Authentication failed. Generic outcome prevents enumeration.
    Failed,
}

/// Input for bootstrapping the first tenant administrator.
#[derive(Debug, Clone)]
pub struct BootstrapAdministratorInput {
    /// Name of the tenant to create.
    pub tenant_name: String,
    /// Administrator email.
    pub email: String,
    /// Administrator display name.
    pub display_name: String,
    /// Administrator password.
    pub password: String,
}

/// Input for creating a user account.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Account email.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Initial password.
    pub password: String,
    /// Roles granted at creation.
    pub role_ids: Vec<RoleId>,
}

/// Input for updating a user account.
#[derive(Debug, Clone)]
pub struct UpdateUserInput {
    /// New display name.
    pub display_name: String,
    /// New active flag.
    pub is_active: bool,
}

/// Name of the role granted to the bootstrapped administrator.
pub const ADMINISTRATOR_ROLE_NAME: &str = "Administrator";

/// Application service for user administration and authentication.
#[derive(Clone)]
pub struct UserService {
    authorization_service: AuthorizationService,
    user_repository: Arc<dyn UserRepository>,
    role_repository: Arc<dyn RoleRepository>,
    tenant_repository: Arc<dyn TenantRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        user_repository: Arc<dyn UserRepository>,
        role_repository: Arc<dyn RoleRepository>,
        tenant_repository: Arc<dyn TenantRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            user_repository,
            role_repository,
            tenant_repository,
            password_hasher,
            audit_repository,
        }
    }
}

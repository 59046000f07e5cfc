use std::sync::Arc;

use sqlx::PgPool;
use tasklane_application::{
    AuditLogRepository, AuditLogService, AuditRepository, AuthTokenRepository, AuthTokenService,
    AuthorizationRepository, AuthorizationService, EmailService, PasswordHasher,
    ProjectRepository, ProjectService, RoleRepository, RoleService, TaskRepository, TaskService,
    TenantRepository, UserRepository, UserService,
};
use tasklane_infrastructure::{
    Argon2PasswordHasher, ConsoleEmailService, PostgresAuditLogRepository,
    PostgresAuditRepository, PostgresAuthTokenRepository, PostgresAuthorizationRepository,
    PostgresProjectRepository, PostgresRoleRepository, PostgresTaskRepository,
    PostgresTenantRepository, PostgresUserRepository,
};

use crate::state::AppState;

/// Adapters backing every application service.
#[derive(Clone)]
pub struct ServicePorts {
    pub authorization: Arc<dyn AuthorizationRepository>,
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub tenants: Arc<dyn TenantRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub audit_log: Arc<dyn AuditLogRepository>,
    pub tokens: Arc<dyn AuthTokenRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub email: Arc<dyn EmailService>,
}

impl ServicePorts {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            authorization: Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            roles: Arc::new(PostgresRoleRepository::new(pool.clone())),
            tenants: Arc::new(PostgresTenantRepository::new(pool.clone())),
            projects: Arc::new(PostgresProjectRepository::new(pool.clone())),
            tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
            audit: Arc::new(PostgresAuditRepository::new(pool.clone())),
            audit_log: Arc::new(PostgresAuditLogRepository::new(pool.clone())),
            tokens: Arc::new(PostgresAuthTokenRepository::new(pool)),
            password_hasher: Arc::new(Argon2PasswordHasher::new()),
            email: Arc::new(ConsoleEmailService::new()),
        }
    }

    #[cfg(test)]
    pub fn in_memory(store: Arc<tasklane_infrastructure::InMemoryStore>) -> Self {
        Self {
            authorization: store.clone(),
            users: store.clone(),
            roles: store.clone(),
            tenants: store.clone(),
            projects: store.clone(),
            tasks: store.clone(),
            audit: store.clone(),
            audit_log: store.clone(),
            tokens: store,
            password_hasher: Arc::new(Argon2PasswordHasher::new()),
            email: Arc::new(ConsoleEmailService::new()),
        }
    }
}

pub fn build_app_state(
    ports: ServicePorts,
    frontend_url: String,
    bootstrap_token: String,
) -> AppState {
    let authorization_service = AuthorizationService::new(ports.authorization);

    let user_service = UserService::new(
        authorization_service.clone(),
        ports.users.clone(),
        ports.roles.clone(),
        ports.tenants,
        ports.password_hasher.clone(),
        ports.audit.clone(),
    );
    let role_service = RoleService::new(
        authorization_service.clone(),
        ports.roles,
        ports.audit.clone(),
    );
    let project_service = ProjectService::new(
        authorization_service.clone(),
        ports.projects.clone(),
        ports.users.clone(),
        ports.audit.clone(),
    );
    let task_service = TaskService::new(
        authorization_service.clone(),
        ports.tasks,
        ports.projects,
        ports.users.clone(),
        ports.audit.clone(),
    );
    let auth_token_service = AuthTokenService::new(
        ports.tokens,
        ports.users,
        ports.password_hasher,
        ports.email,
        ports.audit,
        frontend_url.clone(),
    );
    let audit_log_service = AuditLogService::new(authorization_service.clone(), ports.audit_log);

    AppState {
        authorization_service,
        user_service,
        role_service,
        project_service,
        task_service,
        auth_token_service,
        audit_log_service,
        frontend_url,
        bootstrap_token,
    }
}

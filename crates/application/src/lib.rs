//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_log_service;
mod auth_token_service;
mod authorization_service;
mod project_service;
mod role_service;
mod task_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use audit_log_service::{
    AUDIT_LOG_MAX_LIMIT, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditLogService, AuditRepository,
};
pub use auth_token_service::{
    AuthTokenRepository, AuthTokenService, EmailService, PASSWORD_RESET_MAX_REQUESTS_PER_HOUR,
    PasswordResetTokenRecord,
};
pub use authorization_service::{AuthorizationRepository, AuthorizationService};
pub use project_service::{ProjectInput, ProjectRepository, ProjectService};
pub use role_service::{RoleInput, RoleRepository, RoleService};
pub use task_service::{CreateTaskInput, TaskQuery, TaskRepository, TaskService, UpdateTaskInput};
pub use user_service::{
    ADMINISTRATOR_ROLE_NAME, AuthOutcome, BootstrapAdministratorInput, CreateUserInput, NewUser,
    PasswordHasher, TenantRepository, UpdateUserInput, UserRecord, UserRepository, UserService,
};

//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod console_email_service;
mod in_memory_store;
mod postgres_audit_log_repository;
mod postgres_audit_repository;
mod postgres_auth_token_repository;
mod postgres_authorization_repository;
mod postgres_errors;
mod postgres_project_repository;
mod postgres_role_repository;
mod postgres_task_repository;
mod postgres_tenant_repository;
mod postgres_user_repository;

#[cfg(test)]
mod postgres_test_support;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use console_email_service::ConsoleEmailService;
pub use in_memory_store::InMemoryStore;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_auth_token_repository::PostgresAuthTokenRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_project_repository::PostgresProjectRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_task_repository::PostgresTaskRepository;
pub use postgres_tenant_repository::PostgresTenantRepository;
pub use postgres_user_repository::PostgresUserRepository;

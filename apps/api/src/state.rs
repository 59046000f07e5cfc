use tasklane_application::{
    AuditLogService, AuthTokenService, AuthorizationService, ProjectService, RoleService,
    TaskService, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub user_service: UserService,
    pub role_service: RoleService,
    pub project_service: ProjectService,
    pub task_service: TaskService,
    pub auth_token_service: AuthTokenService,
    pub audit_log_service: AuditLogService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}

mod auth;
mod common;
mod projects;
mod security;
mod tasks;
mod users;

pub use auth::{
    BootstrapRequest, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    ResetPasswordRequest,
};
pub use common::{GenericMessageResponse, HealthResponse, UserIdentityResponse};
pub use projects::{AddTeamLeadRequest, ProjectRequest, ProjectResponse};
pub use security::{
    AuditLogEntryResponse, AuditLogQueryParams, CapabilityCheckQuery, CapabilityCheckResponse,
    CapabilityResponse, RoleRequest, RoleResponse,
};
pub use tasks::{
    AssignTaskUsersRequest, ChangeTaskStatusRequest, CreateTaskRequest, MoveTaskRequest,
    TaskListQuery, TaskResponse, UpdateTaskRequest,
};
pub use users::{AssignRoleRequest, CreateUserRequest, UpdateUserRequest, UserResponse};

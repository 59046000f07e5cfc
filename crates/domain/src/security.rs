use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when the first administrator is bootstrapped.
    TenantBootstrapped,
    /// Emitted when a user account is created.
    UserCreated,
    /// Emitted when a user account is updated.
    UserUpdated,
    /// Emitted when a user account is deleted.
    UserDeleted,
    /// Emitted when a role is assigned to a user.
    UserRoleAssigned,
    /// Emitted when a role is removed from a user.
    UserRoleUnassigned,
    /// Emitted when a user changes or resets their password.
    UserPasswordChanged,
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role is updated.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a project is created.
    ProjectCreated,
    /// Emitted when a project is updated.
    ProjectUpdated,
    /// Emitted when a project is deleted.
    ProjectDeleted,
    /// Emitted when a team lead joins a project.
    ProjectTeamLeadAdded,
    /// Emitted when a team lead leaves a project.
    ProjectTeamLeadRemoved,
    /// Emitted when a task is created.
    TaskCreated,
    /// Emitted when task details change.
    TaskUpdated,
    /// Emitted when a task status changes.
    TaskStatusChanged,
    /// Emitted when task assignees change.
    TaskAssigneesChanged,
    /// Emitted when a task moves between projects.
    TaskProjectChanged,
    /// Emitted when a task is deleted.
    TaskDeleted,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TenantBootstrapped => "tenant.bootstrapped",
            Self::UserCreated => "user.created",
            Self::UserUpdated => "user.updated",
            Self::UserDeleted => "user.deleted",
            Self::UserRoleAssigned => "user.role.assigned",
            Self::UserRoleUnassigned => "user.role.unassigned",
            Self::UserPasswordChanged => "user.password.changed",
            Self::RoleCreated => "role.created",
            Self::RoleUpdated => "role.updated",
            Self::RoleDeleted => "role.deleted",
            Self::ProjectCreated => "project.created",
            Self::ProjectUpdated => "project.updated",
            Self::ProjectDeleted => "project.deleted",
            Self::ProjectTeamLeadAdded => "project.team_lead.added",
            Self::ProjectTeamLeadRemoved => "project.team_lead.removed",
            Self::TaskCreated => "task.created",
            Self::TaskUpdated => "task.updated",
            Self::TaskStatusChanged => "task.status.changed",
            Self::TaskAssigneesChanged => "task.assignees.changed",
            Self::TaskProjectChanged => "task.project.changed",
            Self::TaskDeleted => "task.deleted",
        }
    }
}

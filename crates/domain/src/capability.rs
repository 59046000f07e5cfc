use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tasklane_core::AppError;
use thiserror::Error;

/// Prefix carried by the persisted permission name of every capability.
pub const PERMISSION_NAME_PREFIX: &str = "perm_";

/// One named boolean permission in the fixed capability catalog.
///
/// Declaration order is the catalog order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Allows creating user accounts.
    #[serde(rename = "can_create_users")]
    CreateUsers,
    /// Allows editing user accounts and their role memberships.
    #[serde(rename = "can_edit_users")]
    EditUsers,
    /// Allows reading user accounts.
    #[serde(rename = "can_read_users")]
    ReadUsers,
    /// Allows deleting user accounts.
    #[serde(rename = "can_delete_users")]
    DeleteUsers,
    /// Allows creating tasks.
    #[serde(rename = "can_create_tasks")]
    CreateTasks,
    /// Allows editing tasks of projects the user leads.
    #[serde(rename = "can_edit_tasks")]
    EditTasks,
    /// Allows reading every task of projects the user leads.
    #[serde(rename = "can_read_all_tasks")]
    ReadAllTasks,
    /// Allows deleting tasks.
    #[serde(rename = "can_delete_tasks")]
    DeleteTasks,
    /// Allows changing the assignees of a task.
    #[serde(rename = "can_assign_tasks_to_user")]
    AssignTasksToUser,
    /// Allows moving a task into a project.
    #[serde(rename = "can_assign_tasks_to_project")]
    AssignTasksToProject,
    /// Allows creating projects.
    #[serde(rename = "can_create_projects")]
    CreateProjects,
    /// Allows editing projects and their team leads.
    #[serde(rename = "can_edit_projects")]
    EditProjects,
    /// Allows reading projects.
    #[serde(rename = "can_read_projects")]
    ReadProjects,
    /// Allows deleting projects.
    #[serde(rename = "can_delete_projects")]
    DeleteProjects,
}

/// Lookup of a capability name outside the fixed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown capability '{name}'")]
pub struct UnknownCapability {
    /// The name that failed to resolve.
    pub name: String,
}

impl From<UnknownCapability> for AppError {
    fn from(value: UnknownCapability) -> Self {
        AppError::Validation(value.to_string())
    }
}

const CATALOG: &[Capability] = &[
    Capability::CreateUsers,
    Capability::EditUsers,
    Capability::ReadUsers,
    Capability::DeleteUsers,
    Capability::CreateTasks,
    Capability::EditTasks,
    Capability::ReadAllTasks,
    Capability::DeleteTasks,
    Capability::AssignTasksToUser,
    Capability::AssignTasksToProject,
    Capability::CreateProjects,
    Capability::EditProjects,
    Capability::ReadProjects,
    Capability::DeleteProjects,
];

impl Capability {
    /// Returns every catalog capability in catalog order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        CATALOG
    }

    /// Returns the stable capability name used on the wire and in storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateUsers => "can_create_users",
            Self::EditUsers => "can_edit_users",
            Self::ReadUsers => "can_read_users",
            Self::DeleteUsers => "can_delete_users",
            Self::CreateTasks => "can_create_tasks",
            Self::EditTasks => "can_edit_tasks",
            Self::ReadAllTasks => "can_read_all_tasks",
            Self::DeleteTasks => "can_delete_tasks",
            Self::AssignTasksToUser => "can_assign_tasks_to_user",
            Self::AssignTasksToProject => "can_assign_tasks_to_project",
            Self::CreateProjects => "can_create_projects",
            Self::EditProjects => "can_edit_projects",
            Self::ReadProjects => "can_read_projects",
            Self::DeleteProjects => "can_delete_projects",
        }
    }

    /// Returns the persisted permission name, e.g. `perm_can_edit_tasks`.
    #[must_use]
    pub fn permission_name(&self) -> String {
        format!("{PERMISSION_NAME_PREFIX}{}", self.as_str())
    }

    /// Returns a short human description of the capability.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::CreateUsers => "Create user accounts",
            Self::EditUsers => "Edit user accounts and role memberships",
            Self::ReadUsers => "Read user accounts",
            Self::DeleteUsers => "Delete user accounts",
            Self::CreateTasks => "Create tasks",
            Self::EditTasks => "Edit tasks of led projects",
            Self::ReadAllTasks => "Read all tasks of led projects",
            Self::DeleteTasks => "Delete tasks",
            Self::AssignTasksToUser => "Assign tasks to users",
            Self::AssignTasksToProject => "Assign tasks to projects",
            Self::CreateProjects => "Create projects",
            Self::EditProjects => "Edit projects and team leads",
            Self::ReadProjects => "Read projects",
            Self::DeleteProjects => "Delete projects",
        }
    }

    /// Returns the catalog position of this capability.
    #[must_use]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parses a wire value, accepting both `can_x` and `perm_can_x` forms.
    ///
    /// Matching is exact: surrounding whitespace or other casing is unknown.
    pub fn parse(value: &str) -> Result<Self, UnknownCapability> {
        let name = value
            .strip_prefix(PERMISSION_NAME_PREFIX)
            .unwrap_or(value);

        CATALOG
            .iter()
            .copied()
            .find(|capability| capability.as_str() == name)
            .ok_or_else(|| UnknownCapability {
                name: value.to_owned(),
            })
    }
}

impl Display for Capability {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

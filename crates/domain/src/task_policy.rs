//! Task authorization rules.
//!
//! Task access combines identity relationships (creator, assignee, project
//! creator, project team lead) with role-derived capabilities. Every rule is
//! evaluated against read-only snapshots; first match wins and no match
//! denies.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::permission_registry::effective_capabilities;
use crate::{Capability, CapabilitySet, Principal, Project, Task, UserId};

/// Action a principal attempts on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    /// Create a new task.
    Create,
    /// Read a task.
    View,
    /// Change title, description, assignees or project.
    Edit,
    /// Move a task through its statuses.
    ChangeStatus,
    /// Remove a task.
    Delete,
}

impl TaskAction {
    /// Returns the stable action name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::View => "view",
            Self::Edit => "edit",
            Self::ChangeStatus => "change_status",
            Self::Delete => "delete",
        }
    }
}

impl Display for TaskAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Task snapshot paired with its project, when it has one.
#[derive(Debug, Clone, Copy)]
pub struct TaskTarget<'a> {
    task: &'a Task,
    project: Option<&'a Project>,
}

impl<'a> TaskTarget<'a> {
    /// Pairs a task with its project.
    ///
    /// A project that is not the task's own project is ignored.
    #[must_use]
    pub fn new(task: &'a Task, project: Option<&'a Project>) -> Self {
        let project = project.filter(|project| task.project_id() == Some(project.id()));
        Self { task, project }
    }

    /// Returns the task.
    #[must_use]
    pub fn task(&self) -> &'a Task {
        self.task
    }

    /// Returns the task's project, if loaded.
    #[must_use]
    pub fn project(&self) -> Option<&'a Project> {
        self.project
    }

    fn is_team_lead(&self, user_id: UserId) -> bool {
        self.project
            .is_some_and(|project| project.is_team_lead(user_id))
    }

    fn is_project_creator(&self, user_id: UserId) -> bool {
        self.project
            .is_some_and(|project| project.is_creator(user_id))
    }
}

/// Decides whether the actor may perform the action on the target task.
///
/// `actor` is `None` for anonymous callers; `target` is `None` for
/// [`TaskAction::Create`]. Every other action denies without a target.
#[must_use]
pub fn decide(action: TaskAction, actor: Option<&Principal>, target: Option<&TaskTarget<'_>>) -> bool {
    let Some(actor) = actor else {
        return false;
    };
    if !actor.is_active() {
        return false;
    }

    let capabilities = effective_capabilities(actor);
    let user_id = actor.user_id();

    match action {
        TaskAction::Create => capabilities.contains(Capability::CreateTasks),
        TaskAction::Delete => {
            target.is_some() && capabilities.contains(Capability::DeleteTasks)
        }
        TaskAction::View => target.is_some_and(|target| can_view(user_id, capabilities, target)),
        TaskAction::Edit | TaskAction::ChangeStatus => {
            target.is_some_and(|target| can_edit(user_id, capabilities, target))
        }
    }
}

fn can_view(user_id: UserId, capabilities: CapabilitySet, target: &TaskTarget<'_>) -> bool {
    let task = target.task();

    if task.is_creator(user_id) {
        return true;
    }
    if task.is_assigned_to(user_id) {
        return true;
    }
    if target.is_project_creator(user_id) {
        return true;
    }

    capabilities.contains(Capability::ReadAllTasks) && target.is_team_lead(user_id)
}

fn can_edit(user_id: UserId, capabilities: CapabilitySet, target: &TaskTarget<'_>) -> bool {
    let task = target.task();

    if task.is_creator(user_id) {
        return true;
    }
    if task.is_assigned_to(user_id) {
        return true;
    }

    let can_edit_tasks = capabilities.contains(Capability::EditTasks);
    if can_edit_tasks && target.is_team_lead(user_id) {
        return true;
    }

    // Covered by the creator rule above; kept so the table reads in full.
    can_edit_tasks && task.project_id().is_none() && task.is_creator(user_id)
}

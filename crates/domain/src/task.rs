use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tasklane_core::{AppError, AppResult, NonEmptyString};

use crate::project::normalize_description;
use crate::{ProjectId, TaskId, UserId};

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Work is underway.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(AppError::Validation(format!(
                "unknown task status '{value}'"
            ))),
        }
    }
}

/// Unit of work with one creator, any number of assignees and an optional project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    title: NonEmptyString,
    description: Option<String>,
    status: TaskStatus,
    created_by: UserId,
    assignee_ids: BTreeSet<UserId>,
    project_id: Option<ProjectId>,
}

impl Task {
    /// Creates a new task in `todo` status with no assignees.
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        description: Option<String>,
        created_by: UserId,
        project_id: Option<ProjectId>,
    ) -> AppResult<Self> {
        Self::from_parts(
            id,
            title,
            description,
            TaskStatus::Todo,
            created_by,
            Vec::<UserId>::new(),
            project_id,
        )
    }

    /// Restores a task from persisted parts.
    pub fn from_parts(
        id: TaskId,
        title: impl Into<String>,
        description: Option<String>,
        status: TaskStatus,
        created_by: UserId,
        assignee_ids: impl IntoIterator<Item = UserId>,
        project_id: Option<ProjectId>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            title: NonEmptyString::new(title)?,
            description: normalize_description(description),
            status,
            created_by,
            assignee_ids: assignee_ids.into_iter().collect(),
            project_id,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &NonEmptyString {
        &self.title
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creator.
    #[must_use]
    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the assignee set.
    #[must_use]
    pub fn assignee_ids(&self) -> &BTreeSet<UserId> {
        &self.assignee_ids
    }

    /// Returns the owning project, if any.
    #[must_use]
    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns whether the user created the task.
    #[must_use]
    pub fn is_creator(&self, user_id: UserId) -> bool {
        self.created_by == user_id
    }

    /// Returns whether the user is an assignee.
    #[must_use]
    pub fn is_assigned_to(&self, user_id: UserId) -> bool {
        self.assignee_ids.contains(&user_id)
    }

    /// Updates title and description.
    pub fn update_details(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
    ) -> AppResult<()> {
        self.title = NonEmptyString::new(title)?;
        self.description = normalize_description(description);
        Ok(())
    }

    /// Sets the status.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Replaces the assignee set.
    pub fn replace_assignees(&mut self, assignee_ids: impl IntoIterator<Item = UserId>) {
        self.assignee_ids = assignee_ids.into_iter().collect();
    }

    /// Moves the task into a project, or out of any project with `None`.
    pub fn set_project(&mut self, project_id: Option<ProjectId>) {
        self.project_id = project_id;
    }
}

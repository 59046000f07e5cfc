use serde::{Deserialize, Serialize};
use tasklane_domain::Task;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-task-request.ts"
)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub assignee_ids: Vec<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-task-request.ts"
)]
pub struct UpdateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/change-task-status-request.ts"
)]
pub struct ChangeTaskStatusRequest {
    /// One of `todo`, `in_progress`, `done`.
    pub status: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-task-users-request.ts"
)]
pub struct AssignTaskUsersRequest {
    pub assignee_ids: Vec<String>,
}

/// A `null` project detaches the task.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/move-task-request.ts"
)]
pub struct MoveTaskRequest {
    pub project_id: Option<String>,
}

/// Query string filters for task listing.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub project_id: Option<String>,
    pub status: Option<String>,
}

/// API representation of a task.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/task-response.ts"
)]
pub struct TaskResponse {
    pub task_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub created_by: String,
    pub project_id: Option<String>,
    pub assignee_ids: Vec<String>,
}

impl From<Task> for TaskResponse {
    fn from(value: Task) -> Self {
        Self {
            task_id: value.id().to_string(),
            title: value.title().as_str().to_owned(),
            description: value.description().map(ToOwned::to_owned),
            status: value.status().as_str().to_owned(),
            created_by: value.created_by().to_string(),
            project_id: value.project_id().map(|project_id| project_id.to_string()),
            assignee_ids: value
                .assignee_ids()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

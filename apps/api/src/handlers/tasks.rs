use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use tasklane_application::{CreateTaskInput, TaskQuery, UpdateTaskInput};
use tasklane_core::{AppError, UserIdentity};
use tasklane_domain::{ProjectId, TaskId, TaskStatus};

use crate::dto::{
    AssignTaskUsersRequest, ChangeTaskStatusRequest, CreateTaskRequest, MoveTaskRequest,
    TaskListQuery, TaskResponse, UpdateTaskRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_ids;

fn task_query_from_request(query: TaskListQuery) -> Result<TaskQuery, AppError> {
    Ok(TaskQuery {
        project_id: query
            .project_id
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<ProjectId>())
            .transpose()?,
        status: query
            .status
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<TaskStatus>())
            .transpose()?,
    })
}

/// GET /api/tasks - Tasks the actor may view, optionally filtered.
pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state
        .task_service
        .list_tasks(&user, task_query_from_request(query)?)
        .await?
        .into_iter()
        .map(TaskResponse::from)
        .collect();

    Ok(Json(tasks))
}

pub async fn create_task_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let project_id = payload
        .project_id
        .as_deref()
        .map(str::parse::<ProjectId>)
        .transpose()?;
    let task = state
        .task_service
        .create_task(
            &user,
            CreateTaskInput {
                title: payload.title,
                description: payload.description,
                project_id,
                assignee_ids: parse_ids(&payload.assignee_ids)?,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

pub async fn get_task_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id: TaskId = task_id.parse()?;
    let task = state.task_service.get_task(&user, task_id).await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn update_task_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(task_id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id: TaskId = task_id.parse()?;
    let task = state
        .task_service
        .update_task(
            &user,
            task_id,
            UpdateTaskInput {
                title: payload.title,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn change_task_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(task_id): Path<String>,
    Json(payload): Json<ChangeTaskStatusRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id: TaskId = task_id.parse()?;
    let status: TaskStatus = payload.status.parse()?;
    let task = state
        .task_service
        .change_status(&user, task_id, status)
        .await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn assign_task_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(task_id): Path<String>,
    Json(payload): Json<AssignTaskUsersRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id: TaskId = task_id.parse()?;
    let task = state
        .task_service
        .assign_users(&user, task_id, parse_ids(&payload.assignee_ids)?)
        .await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn move_task_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(task_id): Path<String>,
    Json(payload): Json<MoveTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id: TaskId = task_id.parse()?;
    let project_id = payload
        .project_id
        .as_deref()
        .map(str::parse::<ProjectId>)
        .transpose()?;
    let task = state
        .task_service
        .move_to_project(&user, task_id, project_id)
        .await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn delete_task_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(task_id): Path<String>,
) -> ApiResult<StatusCode> {
    let task_id: TaskId = task_id.parse()?;
    state.task_service.delete_task(&user, task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;

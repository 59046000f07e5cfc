use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use tasklane_core::UserIdentity;
use tasklane_domain::{ProjectId, UserId};

use crate::dto::{AddTeamLeadRequest, ProjectRequest, ProjectResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = state
        .project_service
        .list_projects(&user)
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();

    Ok(Json(projects))
}

pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<ProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let project = state
        .project_service
        .create_project(&user, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

pub async fn get_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ProjectResponse>> {
    let project_id: ProjectId = project_id.parse()?;
    let project = state.project_service.get_project(&user, project_id).await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn update_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
    Json(payload): Json<ProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project_id: ProjectId = project_id.parse()?;
    let project = state
        .project_service
        .update_project(&user, project_id, payload.into())
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn delete_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<StatusCode> {
    let project_id: ProjectId = project_id.parse()?;
    state
        .project_service
        .delete_project(&user, project_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_team_lead_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
    Json(payload): Json<AddTeamLeadRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project_id: ProjectId = project_id.parse()?;
    let lead_id: UserId = payload.user_id.parse()?;
    let project = state
        .project_service
        .add_team_lead(&user, project_id, lead_id)
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn remove_team_lead_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((project_id, lead_id)): Path<(String, String)>,
) -> ApiResult<Json<ProjectResponse>> {
    let project_id: ProjectId = project_id.parse()?;
    let lead_id: UserId = lead_id.parse()?;
    let project = state
        .project_service
        .remove_team_lead(&user, project_id, lead_id)
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

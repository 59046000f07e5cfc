use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use tasklane_application::{CreateUserInput, UpdateUserInput};
use tasklane_core::UserIdentity;
use tasklane_domain::{RoleId, UserId};

use crate::dto::{AssignRoleRequest, CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_ids;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let created = state
        .user_service
        .create_user(
            &user,
            CreateUserInput {
                email: payload.email,
                display_name: payload.display_name,
                password: payload.password,
                role_ids: parse_ids(&payload.role_ids)?,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user_id: UserId = user_id.parse()?;
    let record = state.user_service.get_user(&user, user_id).await?;

    Ok(Json(UserResponse::from(record)))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user_id: UserId = user_id.parse()?;
    let record = state
        .user_service
        .update_user(
            &user,
            user_id,
            UpdateUserInput {
                display_name: payload.display_name,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(record)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id: UserId = user_id.parse()?;
    state.user_service.delete_user(&user, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user_id: UserId = user_id.parse()?;
    let role_id: RoleId = payload.role_id.parse()?;
    let record = state
        .user_service
        .assign_role(&user, user_id, role_id)
        .await?;

    Ok(Json(UserResponse::from(record)))
}

pub async fn unassign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, role_id)): Path<(String, String)>,
) -> ApiResult<Json<UserResponse>> {
    let user_id: UserId = user_id.parse()?;
    let role_id: RoleId = role_id.parse()?;
    let record = state
        .user_service
        .unassign_role(&user, user_id, role_id)
        .await?;

    Ok(Json(UserResponse::from(record)))
}

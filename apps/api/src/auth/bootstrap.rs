use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tasklane_application::{BootstrapAdministratorInput, UserService};
use tasklane_core::AppError;
use tower_sessions::Session;
use tracing::info;

use crate::dto::{BootstrapRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::establish_session;

/// Creates the first tenant and its administrator, then signs them in.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let administrator = state
        .user_service
        .bootstrap_administrator(BootstrapAdministratorInput {
            tenant_name: payload.tenant_name,
            email: payload.email,
            display_name: payload.display_name,
            password: payload.password,
        })
        .await?;

    establish_session(&session, &UserService::session_identity(&administrator)).await?;
    info!(user_id = %administrator.id, "bootstrapped tenant administrator");

    Ok((StatusCode::CREATED, Json(UserResponse::from(administrator))))
}

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tasklane_core::UserIdentity;

use crate::dto::{
    ChangePasswordRequest, ForgotPasswordRequest, GenericMessageResponse, ResetPasswordRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// PUT /api/profile/password - Change the signed-in user's password.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    state
        .user_service
        .change_password(&user, &payload.current_password, &payload.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/forgot-password - Always answers the same way to prevent enumeration.
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    if let Err(error) = state
        .auth_token_service
        .request_password_reset(&payload.email)
        .await
    {
        tracing::warn!(%error, "password reset request failed");
    }

    Ok(Json(GenericMessageResponse::new(
        "If an account exists with this email, a reset link has been sent.",
    )))
}

pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    state
        .auth_token_service
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    Ok(Json(GenericMessageResponse::new(
        "Password has been reset. You can now sign in.",
    )))
}

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tasklane_application::{AuthOutcome, UserService};
use tasklane_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::{LoginRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_USER_KEY, establish_session};

/// POST /auth/login - Sign in with email and password.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let AuthOutcome::Authenticated(user) = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?
    else {
        return Err(AppError::Unauthorized("invalid email or password".to_owned()).into());
    };

    let identity = UserService::session_identity(&user);
    establish_session(&session, &identity).await?;

    identity_response(&state, identity).await
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let subject = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(|identity| identity.subject().to_owned());

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(subject) = subject {
        tracing::info!(%subject, "signed out");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - Signed-in identity with its resolved capability map.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<UserIdentityResponse>> {
    identity_response(&state, user).await
}

async fn identity_response(
    state: &AppState,
    identity: UserIdentity,
) -> ApiResult<Json<UserIdentityResponse>> {
    let capabilities = state
        .authorization_service
        .effective_capabilities(&identity)
        .await?;

    Ok(Json(UserIdentityResponse::from_identity_with_capabilities(
        identity,
        capabilities,
    )))
}

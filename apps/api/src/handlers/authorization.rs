use axum::Json;
use axum::extract::{Extension, Query, State};
use tasklane_core::UserIdentity;
use tasklane_domain::Capability;

use crate::dto::{CapabilityCheckQuery, CapabilityCheckResponse, CapabilityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/capabilities - The fixed capability catalog.
pub async fn list_capabilities_handler() -> Json<Vec<CapabilityResponse>> {
    Json(
        Capability::all()
            .iter()
            .copied()
            .map(CapabilityResponse::from)
            .collect(),
    )
}

/// GET /api/authorization/check - Fail-closed check of one capability name.
pub async fn check_capability_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<CapabilityCheckQuery>,
) -> ApiResult<Json<CapabilityCheckResponse>> {
    let granted = state
        .authorization_service
        .authorize(&user, &query.capability)
        .await?;

    Ok(Json(CapabilityCheckResponse {
        capability: query.capability,
        granted,
    }))
}

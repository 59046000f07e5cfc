use std::collections::BTreeMap;

use serde::Serialize;
use tasklane_core::UserIdentity;
use tasklane_domain::Capability;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Generic message response for auth flows.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generic-message-response.ts"
)]
pub struct GenericMessageResponse {
    pub message: String,
}

impl GenericMessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub tenant_id: String,
    /// Every catalog capability with its resolved flag.
    pub capabilities: BTreeMap<String, bool>,
}

impl UserIdentityResponse {
    pub fn from_identity_with_capabilities(
        identity: UserIdentity,
        capabilities: BTreeMap<Capability, bool>,
    ) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            tenant_id: identity.tenant_id().to_string(),
            capabilities: capability_flags(capabilities),
        }
    }
}

pub(super) fn capability_flags(flags: BTreeMap<Capability, bool>) -> BTreeMap<String, bool> {
    flags
        .into_iter()
        .map(|(capability, granted)| (capability.as_str().to_owned(), granted))
        .collect()
}

use serde::{Deserialize, Serialize};
use tasklane_application::UserRecord;
use ts_rs::TS;

/// Incoming payload for account creation by an administrator.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    #[serde(default)]
    pub role_ids: Vec<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    pub display_name: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub role_id: String,
}

/// API representation of a user account. Password hashes never leave the service.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub is_active: bool,
    pub role_ids: Vec<String>,
}

impl From<UserRecord> for UserResponse {
    fn from(value: UserRecord) -> Self {
        Self {
            user_id: value.id.to_string(),
            email: value.email,
            display_name: value.display_name,
            is_active: value.is_active,
            role_ids: value
                .role_ids
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

use serde::{Deserialize, Serialize};
use tasklane_application::ProjectInput;
use tasklane_domain::Project;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/project-request.ts"
)]
pub struct ProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/add-team-lead-request.ts"
)]
pub struct AddTeamLeadRequest {
    pub user_id: String,
}

impl From<ProjectRequest> for ProjectInput {
    fn from(value: ProjectRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
        }
    }
}

/// API representation of a project.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/project-response.ts"
)]
pub struct ProjectResponse {
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub team_lead_ids: Vec<String>,
}

impl From<Project> for ProjectResponse {
    fn from(value: Project) -> Self {
        Self {
            project_id: value.id().to_string(),
            name: value.name().as_str().to_owned(),
            description: value.description().map(ToOwned::to_owned),
            created_by: value.created_by().to_string(),
            team_lead_ids: value
                .team_lead_ids()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

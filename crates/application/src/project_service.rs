use std::sync::Arc;

use async_trait::async_trait;

use tasklane_core::{AppError, AppResult, TenantId, UserIdentity};
use tasklane_domain::{AuditAction, Capability, Project, ProjectId, UserId};

use crate::{AuditEvent, AuditRepository, AuthorizationService, UserRepository};

/// Repository port for project persistence.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Lists tenant projects ordered by name.
    async fn list_projects(&self, tenant_id: TenantId) -> AppResult<Vec<Project>>;

    /// Finds one tenant project.
    async fn find_project(
        &self,
        tenant_id: TenantId,
        project_id: ProjectId,
    ) -> AppResult<Option<Project>>;

    /// Persists a new project with its team leads.
    async fn create_project(&self, tenant_id: TenantId, project: &Project) -> AppResult<()>;

    /// Replaces a project's details and team lead set.
    async fn save_project(&self, tenant_id: TenantId, project: &Project) -> AppResult<()>;

    /// Deletes a project; its tasks keep existing without a project.
    async fn delete_project(&self, tenant_id: TenantId, project_id: ProjectId) -> AppResult<()>;
}

/// Input for creating or updating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInput {
    /// Project name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Application service for project administration.
#[derive(Clone)]
pub struct ProjectService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn ProjectRepository>,
    user_repository: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ProjectService {
    /// Creates a new project service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn ProjectRepository>,
        user_repository: Arc<dyn UserRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            user_repository,
            audit_repository,
        }
    }

    /// Creates a project led by its creator.
    pub async fn create_project(
        &self,
        actor: &UserIdentity,
        input: ProjectInput,
    ) -> AppResult<Project> {
        let principal = self
            .authorization_service
            .require_capability(actor, Capability::CreateProjects)
            .await?;

        let project = Project::new(
            ProjectId::new(),
            input.name,
            input.description,
            principal.user_id(),
        )?;
        self.repository
            .create_project(actor.tenant_id(), &project)
            .await?;

        self.audit(
            actor,
            AuditAction::ProjectCreated,
            &project,
            Some(format!("created project '{}'", project.name())),
        )
        .await?;

        Ok(project)
    }

    /// Lists tenant projects.
    pub async fn list_projects(&self, actor: &UserIdentity) -> AppResult<Vec<Project>> {
        self.authorization_service
            .require_capability(actor, Capability::ReadProjects)
            .await?;

        self.repository.list_projects(actor.tenant_id()).await
    }

    /// Returns one project.
    pub async fn get_project(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<Project> {
        self.authorization_service
            .require_capability(actor, Capability::ReadProjects)
            .await?;

        self.find_project(actor, project_id).await
    }

    /// Updates name and description.
    pub async fn update_project(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        input: ProjectInput,
    ) -> AppResult<Project> {
        self.authorization_service
            .require_capability(actor, Capability::EditProjects)
            .await?;

        let mut project = self.find_project(actor, project_id).await?;
        project.update_details(input.name, input.description)?;
        self.repository
            .save_project(actor.tenant_id(), &project)
            .await?;

        self.audit(actor, AuditAction::ProjectUpdated, &project, None)
            .await?;

        Ok(project)
    }

    /// Deletes a project.
    pub async fn delete_project(&self, actor: &UserIdentity, project_id: ProjectId) -> AppResult<()> {
        self.authorization_service
            .require_capability(actor, Capability::DeleteProjects)
            .await?;

        let project = self.find_project(actor, project_id).await?;
        self.repository
            .delete_project(actor.tenant_id(), project_id)
            .await?;

        self.audit(
            actor,
            AuditAction::ProjectDeleted,
            &project,
            Some(format!("deleted project '{}'", project.name())),
        )
        .await
    }

    /// Adds a tenant user to the project's team leads.
    pub async fn add_team_lead(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Project> {
        self.authorization_service
            .require_capability(actor, Capability::EditProjects)
            .await?;

        let mut project = self.find_project(actor, project_id).await?;
        if self
            .user_repository
            .find_by_id(actor.tenant_id(), user_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        if project.add_team_lead(user_id) {
            self.repository
                .save_project(actor.tenant_id(), &project)
                .await?;
            self.audit(
                actor,
                AuditAction::ProjectTeamLeadAdded,
                &project,
                Some(format!("added team lead '{user_id}'")),
            )
            .await?;
        }

        Ok(project)
    }

    /// Removes a user from the project's team leads, the creator included.
    pub async fn remove_team_lead(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Project> {
        self.authorization_service
            .require_capability(actor, Capability::EditProjects)
            .await?;

        let mut project = self.find_project(actor, project_id).await?;
        if project.remove_team_lead(user_id) {
            self.repository
                .save_project(actor.tenant_id(), &project)
                .await?;
            self.audit(
                actor,
                AuditAction::ProjectTeamLeadRemoved,
                &project,
                Some(format!("removed team lead '{user_id}'")),
            )
            .await?;
        }

        Ok(project)
    }

    async fn find_project(&self, actor: &UserIdentity, project_id: ProjectId) -> AppResult<Project> {
        self.repository
            .find_project(actor.tenant_id(), project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))
    }

    async fn audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        project: &Project,
        detail: Option<String>,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                action,
                "project",
                project.id().to_string(),
                detail,
            ))
            .await
    }
}

//! Task ports and application service.
//!
//! Every operation resolves the actor's principal once, loads the task with
//! its project, and hands both to the task access policy.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use tasklane_core::{AppError, AppResult, TenantId, UserIdentity};
use tasklane_domain::permission_registry;
use tasklane_domain::{
    AuditAction, Capability, Principal, Project, ProjectId, Task, TaskAction, TaskId, TaskStatus,
    TaskTarget, UserId,
};

use crate::{AuditEvent, AuditRepository, AuthorizationService, ProjectRepository, UserRepository};

/// Optional filters for task listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Only tasks in this project.
    pub project_id: Option<ProjectId>,
    /// Only tasks with this status.
    pub status: Option<TaskStatus>,
}

/// Repository port for task persistence.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Lists tenant tasks matching the filters.
    async fn list_tasks(&self, tenant_id: TenantId, query: TaskQuery) -> AppResult<Vec<Task>>;

    /// Finds one tenant task.
    async fn find_task(&self, tenant_id: TenantId, task_id: TaskId) -> AppResult<Option<Task>>;

    /// Persists a new task with its assignees.
    async fn create_task(&self, tenant_id: TenantId, task: &Task) -> AppResult<()>;

    /// Replaces a task's fields and assignee set.
    async fn save_task(&self, tenant_id: TenantId, task: &Task) -> AppResult<()>;

    /// Deletes a task.
    async fn delete_task(&self, tenant_id: TenantId, task_id: TaskId) -> AppResult<()>;
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTaskInput {
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional owning project.
    pub project_id: Option<ProjectId>,
    /// Initial assignees.
    pub assignee_ids: Vec<UserId>,
}

/// Input for updating task details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskInput {
    /// New title.
    pub title: String,
    /// New description.
    pub description: Option<String>,
}

/// Application service for task workflows.
#[derive(Clone)]
pub struct TaskService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn TaskRepository>,
    project_repository: Arc<dyn ProjectRepository>,
    user_repository: Arc<dyn UserRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl TaskService {
    /// Creates a new task service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn TaskRepository>,
        project_repository: Arc<dyn ProjectRepository>,
        user_repository: Arc<dyn UserRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            project_repository,
            user_repository,
            audit_repository,
        }
    }

    /// Creates a task owned by the actor.
    pub async fn create_task(
        &self,
        actor: &UserIdentity,
        input: CreateTaskInput,
    ) -> AppResult<Task> {
        let principal = self.authorization_service.resolve_principal(actor).await?;
        self.authorization_service
            .require_task_action(&principal, TaskAction::Create, None)?;

        if let Some(project_id) = input.project_id {
            require_granted(&principal, Capability::AssignTasksToProject)?;
            self.find_project(actor, project_id).await?;
        }
        if !input.assignee_ids.is_empty() {
            require_granted(&principal, Capability::AssignTasksToUser)?;
            self.ensure_users_exist(actor, &input.assignee_ids).await?;
        }

        let mut task = Task::new(
            TaskId::new(),
            input.title,
            input.description,
            principal.user_id(),
            input.project_id,
        )?;
        task.replace_assignees(input.assignee_ids);
        self.repository.create_task(actor.tenant_id(), &task).await?;

        self.audit(
            actor,
            AuditAction::TaskCreated,
            &task,
            Some(format!("created task '{}'", task.title())),
        )
        .await?;

        Ok(task)
    }

    /// Returns one task the actor may view.
    pub async fn get_task(&self, actor: &UserIdentity, task_id: TaskId) -> AppResult<Task> {
        let principal = self.authorization_service.resolve_principal(actor).await?;
        let (task, project) = self.load_target(actor, task_id).await?;
        self.authorization_service.require_task_action(
            &principal,
            TaskAction::View,
            Some(&TaskTarget::new(&task, project.as_ref())),
        )?;

        Ok(task)
    }

    /// Lists the tasks the actor may view.
    pub async fn list_tasks(&self, actor: &UserIdentity, query: TaskQuery) -> AppResult<Vec<Task>> {
        let principal = self.authorization_service.resolve_principal(actor).await?;
        let tasks = self.repository.list_tasks(actor.tenant_id(), query).await?;
        let projects: HashMap<ProjectId, Project> = self
            .project_repository
            .list_projects(actor.tenant_id())
            .await?
            .into_iter()
            .map(|project| (project.id(), project))
            .collect();

        Ok(tasks
            .into_iter()
            .filter(|task| {
                let project = task.project_id().and_then(|id| projects.get(&id));
                self.authorization_service.can_perform_task_action(
                    &principal,
                    TaskAction::View,
                    Some(&TaskTarget::new(task, project)),
                )
            })
            .collect())
    }

    /// Updates title and description.
    pub async fn update_task(
        &self,
        actor: &UserIdentity,
        task_id: TaskId,
        input: UpdateTaskInput,
    ) -> AppResult<Task> {
        let principal = self.authorization_service.resolve_principal(actor).await?;
        let (mut task, project) = self.load_target(actor, task_id).await?;
        self.authorization_service.require_task_action(
            &principal,
            TaskAction::Edit,
            Some(&TaskTarget::new(&task, project.as_ref())),
        )?;

        task.update_details(input.title, input.description)?;
        self.repository.save_task(actor.tenant_id(), &task).await?;

        self.audit(actor, AuditAction::TaskUpdated, &task, None)
            .await?;
        Ok(task)
    }

    /// Moves a task to another status.
    pub async fn change_status(
        &self,
        actor: &UserIdentity,
        task_id: TaskId,
        status: TaskStatus,
    ) -> AppResult<Task> {
        let principal = self.authorization_service.resolve_principal(actor).await?;
        let (mut task, project) = self.load_target(actor, task_id).await?;
        self.authorization_service.require_task_action(
            &principal,
            TaskAction::ChangeStatus,
            Some(&TaskTarget::new(&task, project.as_ref())),
        )?;

        let previous = task.status();
        task.set_status(status);
        self.repository.save_task(actor.tenant_id(), &task).await?;

        self.audit(
            actor,
            AuditAction::TaskStatusChanged,
            &task,
            Some(format!("{} -> {}", previous.as_str(), status.as_str())),
        )
        .await?;
        Ok(task)
    }

    /// Deletes a task.
    pub async fn delete_task(&self, actor: &UserIdentity, task_id: TaskId) -> AppResult<()> {
        let principal = self.authorization_service.resolve_principal(actor).await?;
        let (task, project) = self.load_target(actor, task_id).await?;
        self.authorization_service.require_task_action(
            &principal,
            TaskAction::Delete,
            Some(&TaskTarget::new(&task, project.as_ref())),
        )?;

        self.repository
            .delete_task(actor.tenant_id(), task_id)
            .await?;

        self.audit(
            actor,
            AuditAction::TaskDeleted,
            &task,
            Some(format!("deleted task '{}'", task.title())),
        )
        .await
    }

    /// Replaces the assignee set.
    pub async fn assign_users(
        &self,
        actor: &UserIdentity,
        task_id: TaskId,
        assignee_ids: Vec<UserId>,
    ) -> AppResult<Task> {
        let principal = self.authorization_service.resolve_principal(actor).await?;
        let (mut task, project) = self.load_target(actor, task_id).await?;
        self.authorization_service.require_task_action(
            &principal,
            TaskAction::Edit,
            Some(&TaskTarget::new(&task, project.as_ref())),
        )?;
        require_granted(&principal, Capability::AssignTasksToUser)?;
        self.ensure_users_exist(actor, &assignee_ids).await?;

        task.replace_assignees(assignee_ids);
        self.repository.save_task(actor.tenant_id(), &task).await?;

        let assignees = task
            .assignee_ids()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        self.audit(
            actor,
            AuditAction::TaskAssigneesChanged,
            &task,
            Some(format!("assignees [{}]", assignees.join(", "))),
        )
        .await?;
        Ok(task)
    }

    /// Moves a task into a project, or out of any project with `None`.
    pub async fn move_to_project(
        &self,
        actor: &UserIdentity,
        task_id: TaskId,
        project_id: Option<ProjectId>,
    ) -> AppResult<Task> {
        let principal = self.authorization_service.resolve_principal(actor).await?;
        let (mut task, project) = self.load_target(actor, task_id).await?;
        self.authorization_service.require_task_action(
            &principal,
            TaskAction::Edit,
            Some(&TaskTarget::new(&task, project.as_ref())),
        )?;
        require_granted(&principal, Capability::AssignTasksToProject)?;

        if let Some(project_id) = project_id {
            self.find_project(actor, project_id).await?;
        }

        task.set_project(project_id);
        self.repository.save_task(actor.tenant_id(), &task).await?;

        let destination = project_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "none".to_owned());
        self.audit(
            actor,
            AuditAction::TaskProjectChanged,
            &task,
            Some(format!("moved to project {destination}")),
        )
        .await?;
        Ok(task)
    }

    async fn load_target(
        &self,
        actor: &UserIdentity,
        task_id: TaskId,
    ) -> AppResult<(Task, Option<Project>)> {
        let task = self
            .repository
            .find_task(actor.tenant_id(), task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' does not exist")))?;

        let project = match task.project_id() {
            Some(project_id) => {
                self.project_repository
                    .find_project(actor.tenant_id(), project_id)
                    .await?
            }
            None => None,
        };

        Ok((task, project))
    }

    async fn find_project(&self, actor: &UserIdentity, project_id: ProjectId) -> AppResult<Project> {
        self.project_repository
            .find_project(actor.tenant_id(), project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))
    }

    async fn ensure_users_exist(&self, actor: &UserIdentity, user_ids: &[UserId]) -> AppResult<()> {
        for user_id in user_ids {
            if self
                .user_repository
                .find_by_id(actor.tenant_id(), *user_id)
                .await?
                .is_none()
            {
                return Err(AppError::Validation(format!(
                    "assignee '{user_id}' does not exist"
                )));
            }
        }

        Ok(())
    }

    async fn audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        task: &Task,
        detail: Option<String>,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent::by_actor(
                actor,
                action,
                "task",
                task.id().to_string(),
                detail,
            ))
            .await
    }
}

fn require_granted(principal: &Principal, capability: Capability) -> AppResult<()> {
    if permission_registry::has_capability(principal, capability) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "user '{}' is missing capability '{}'",
        principal.user_id(),
        capability.as_str()
    )))
}

#[cfg(test)]
mod tests;

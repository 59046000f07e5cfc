use super::*;

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn list_projects(&self, tenant_id: TenantId) -> AppResult<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .read()
            .await
            .values()
            .filter(|(project_tenant_id, _)| *project_tenant_id == tenant_id)
            .map(|(_, project)| project.clone())
            .collect();
        projects.sort_by(|left, right| {
            left.name()
                .as_str()
                .cmp(right.name().as_str())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(projects)
    }

    async fn find_project(
        &self,
        tenant_id: TenantId,
        project_id: ProjectId,
    ) -> AppResult<Option<Project>> {
        Ok(self
            .projects
            .read()
            .await
            .get(&project_id)
            .filter(|(project_tenant_id, _)| *project_tenant_id == tenant_id)
            .map(|(_, project)| project.clone()))
    }

    async fn create_project(&self, tenant_id: TenantId, project: &Project) -> AppResult<()> {
        let mut projects = self.projects.write().await;
        if projects.contains_key(&project.id()) {
            return Err(AppError::Conflict(format!(
                "project '{}' already exists",
                project.id()
            )));
        }

        projects.insert(project.id(), (tenant_id, project.clone()));
        Ok(())
    }

    async fn save_project(&self, tenant_id: TenantId, project: &Project) -> AppResult<()> {
        let mut projects = self.projects.write().await;
        let stored = projects
            .get_mut(&project.id())
            .filter(|(project_tenant_id, _)| *project_tenant_id == tenant_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("project '{}' does not exist", project.id()))
            })?;

        stored.1 = project.clone();
        Ok(())
    }

    async fn delete_project(&self, tenant_id: TenantId, project_id: ProjectId) -> AppResult<()> {
        let mut projects = self.projects.write().await;
        if !projects
            .get(&project_id)
            .is_some_and(|(project_tenant_id, _)| *project_tenant_id == tenant_id)
        {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' does not exist"
            )));
        }
        projects.remove(&project_id);
        drop(projects);

        for (_, task) in self.tasks.write().await.iter_mut() {
            if task.project_id() == Some(project_id) {
                task.set_project(None);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn list_tasks(&self, tenant_id: TenantId, query: TaskQuery) -> AppResult<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .filter(|(task_tenant_id, _)| *task_tenant_id == tenant_id)
            .map(|(_, task)| task)
            .filter(|task| {
                query
                    .project_id
                    .is_none_or(|project_id| task.project_id() == Some(project_id))
            })
            .filter(|task| query.status.is_none_or(|status| task.status() == status))
            .cloned()
            .collect())
    }

    async fn find_task(&self, tenant_id: TenantId, task_id: TaskId) -> AppResult<Option<Task>> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .find(|(task_tenant_id, task)| *task_tenant_id == tenant_id && task.id() == task_id)
            .map(|(_, task)| task.clone()))
    }

    async fn create_task(&self, tenant_id: TenantId, task: &Task) -> AppResult<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.iter().any(|(_, existing)| existing.id() == task.id()) {
            return Err(AppError::Conflict(format!(
                "task '{}' already exists",
                task.id()
            )));
        }

        tasks.push((tenant_id, task.clone()));
        Ok(())
    }

    async fn save_task(&self, tenant_id: TenantId, task: &Task) -> AppResult<()> {
        let mut tasks = self.tasks.write().await;
        let stored = tasks
            .iter_mut()
            .find(|(task_tenant_id, existing)| {
                *task_tenant_id == tenant_id && existing.id() == task.id()
            })
            .ok_or_else(|| AppError::NotFound(format!("task '{}' does not exist", task.id())))?;

        stored.1 = task.clone();
        Ok(())
    }

    async fn delete_task(&self, tenant_id: TenantId, task_id: TaskId) -> AppResult<()> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|(task_tenant_id, task)| !(*task_tenant_id == tenant_id && task.id() == task_id));

        if tasks.len() == before {
            return Err(AppError::NotFound(format!("task '{task_id}' does not exist")));
        }
        Ok(())
    }
}

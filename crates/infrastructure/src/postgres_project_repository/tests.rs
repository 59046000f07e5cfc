use tasklane_application::{ProjectRepository, TaskRepository};
use tasklane_domain::{Project, ProjectId, Task, TaskId};

use super::PostgresProjectRepository;
use crate::PostgresTaskRepository;
use crate::postgres_test_support::{ensure_tenant, insert_user, test_pool};

#[tokio::test]
async fn team_leads_are_replaced_on_save() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresProjectRepository::new(pool.clone());
    let tenant_id = ensure_tenant(&pool, "Projects Tenant").await;
    let creator = insert_user(&pool, tenant_id, true).await;
    let lead = insert_user(&pool, tenant_id, true).await;

    let Ok(mut project) = Project::new(ProjectId::new(), "Apollo", None, creator) else {
        panic!("project fixture should be valid");
    };
    assert!(repository.create_project(tenant_id, &project).await.is_ok());

    assert!(project.add_team_lead(lead));
    assert!(project.remove_team_lead(creator));
    assert!(repository.save_project(tenant_id, &project).await.is_ok());

    let stored = repository
        .find_project(tenant_id, project.id())
        .await
        .unwrap_or_default();
    let Some(stored) = stored else {
        panic!("project should exist");
    };
    assert!(stored.is_team_lead(lead));
    assert!(!stored.is_team_lead(creator));
    assert!(stored.is_creator(creator));
}

#[tokio::test]
async fn deleting_project_detaches_its_tasks() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let projects = PostgresProjectRepository::new(pool.clone());
    let tasks = PostgresTaskRepository::new(pool.clone());
    let tenant_id = ensure_tenant(&pool, "Projects Tenant").await;
    let creator = insert_user(&pool, tenant_id, true).await;

    let Ok(project) = Project::new(ProjectId::new(), "Gemini", None, creator) else {
        panic!("project fixture should be valid");
    };
    assert!(projects.create_project(tenant_id, &project).await.is_ok());

    let Ok(task) = Task::new(TaskId::new(), "Launch", None, creator, Some(project.id())) else {
        panic!("task fixture should be valid");
    };
    assert!(tasks.create_task(tenant_id, &task).await.is_ok());

    assert!(projects.delete_project(tenant_id, project.id()).await.is_ok());

    let stored = tasks.find_task(tenant_id, task.id()).await.unwrap_or_default();
    assert_eq!(stored.map(|task| task.project_id()), Some(None));
}

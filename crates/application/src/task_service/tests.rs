use std::sync::Arc;

use tasklane_core::{AppError, UserIdentity};
use tasklane_domain::{Capability, Project, ProjectId, Task, TaskStatus};

use super::{CreateTaskInput, TaskQuery, TaskService, UpdateTaskInput};
use crate::test_support::{FakeStore, user_id_of};
use crate::{ProjectInput, ProjectService};

fn service(store: &Arc<FakeStore>) -> TaskService {
    TaskService::new(
        store.authorization_service(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    )
}

fn project_service(store: &Arc<FakeStore>) -> ProjectService {
    ProjectService::new(
        store.authorization_service(),
        store.clone(),
        store.clone(),
        store.clone(),
    )
}

fn titled(title: &str) -> CreateTaskInput {
    CreateTaskInput {
        title: title.to_owned(),
        ..CreateTaskInput::default()
    }
}

async fn create_task(store: &Arc<FakeStore>, actor: &UserIdentity, input: CreateTaskInput) -> Task {
    match service(store).create_task(actor, input).await {
        Ok(task) => task,
        Err(error) => panic!("task should be created: {error}"),
    }
}

async fn create_project(store: &Arc<FakeStore>, actor: &UserIdentity) -> Project {
    let input = ProjectInput {
        name: "Launch".to_owned(),
        description: None,
    };
    match project_service(store).create_project(actor, input).await {
        Ok(project) => project,
        Err(error) => panic!("project should be created: {error}"),
    }
}

#[tokio::test]
async fn create_task_follows_capability() {
    let store = Arc::new(FakeStore::default());
    let without = store.seed_user_with(&[]);

    let result = service(&store).create_task(&without, titled("Draft")).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let with = store.seed_user_with(&[Capability::CreateTasks]);
    let task = create_task(&store, &with, titled("Draft")).await;
    assert_eq!(task.created_by(), user_id_of(&with));
    assert_eq!(task.status(), TaskStatus::Todo);
}

#[tokio::test]
async fn create_task_in_project_requires_assign_to_project() {
    let store = Arc::new(FakeStore::default());
    let lead = store.seed_user_with(&[Capability::CreateProjects, Capability::CreateTasks]);
    let project = create_project(&store, &lead).await;

    let input = CreateTaskInput {
        project_id: Some(project.id()),
        ..titled("Draft")
    };
    let result = service(&store).create_task(&lead, input).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn create_task_rejects_unknown_project() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(&[Capability::CreateTasks, Capability::AssignTasksToProject]);

    let input = CreateTaskInput {
        project_id: Some(ProjectId::new()),
        ..titled("Draft")
    };
    let result = service(&store).create_task(&actor, input).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn creator_and_assignee_view_but_stranger_does_not() {
    let store = Arc::new(FakeStore::default());
    let creator = store.seed_user_with(&[Capability::CreateTasks, Capability::AssignTasksToUser]);
    let assignee = store.seed_user_with(&[]);
    let stranger = store.seed_user_with(&[Capability::EditTasks, Capability::ReadAllTasks]);
    let service = service(&store);

    let task = create_task(
        &store,
        &creator,
        CreateTaskInput {
            assignee_ids: vec![user_id_of(&assignee)],
            ..titled("Write docs")
        },
    )
    .await;

    assert!(service.get_task(&creator, task.id()).await.is_ok());
    assert!(service.get_task(&assignee, task.id()).await.is_ok());
    assert!(matches!(
        service.get_task(&stranger, task.id()).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn delete_requires_capability_even_for_creator() {
    let store = Arc::new(FakeStore::default());
    let creator = store.seed_user_with(&[Capability::CreateTasks, Capability::EditTasks]);
    let service = service(&store);
    let task = create_task(&store, &creator, titled("Cleanup")).await;

    assert!(
        service
            .update_task(
                &creator,
                task.id(),
                UpdateTaskInput {
                    title: "Cleanup now".to_owned(),
                    description: None,
                },
            )
            .await
            .is_ok()
    );
    assert!(matches!(
        service.delete_task(&creator, task.id()).await,
        Err(AppError::Forbidden(_))
    ));

    let deleter = store.seed_user_with(&[Capability::DeleteTasks]);
    assert!(service.delete_task(&deleter, task.id()).await.is_ok());
    assert!(store.state().tasks.is_empty());
}

#[tokio::test]
async fn team_lead_with_edit_capability_changes_status() {
    let store = Arc::new(FakeStore::default());
    let owner = store.seed_user_with(&[
        Capability::CreateProjects,
        Capability::CreateTasks,
        Capability::AssignTasksToProject,
        Capability::EditTasks,
    ]);
    let worker = store.seed_user_with(&[Capability::CreateTasks, Capability::AssignTasksToProject]);
    let project = create_project(&store, &owner).await;

    let task = create_task(
        &store,
        &worker,
        CreateTaskInput {
            project_id: Some(project.id()),
            ..titled("Ship build")
        },
    )
    .await;

    let result = service(&store)
        .change_status(&owner, task.id(), TaskStatus::InProgress)
        .await;
    assert!(matches!(result, Ok(ref task) if task.status() == TaskStatus::InProgress));
    assert!(
        store
            .audit_actions()
            .contains(&"task.status.changed")
    );
}

#[tokio::test]
async fn list_tasks_only_returns_visible_tasks() {
    let store = Arc::new(FakeStore::default());
    let alice = store.seed_user_with(&[Capability::CreateTasks]);
    let bob = store.seed_user_with(&[Capability::CreateTasks]);
    let service = service(&store);

    let alice_task = create_task(&store, &alice, titled("Alice")).await;
    create_task(&store, &bob, titled("Bob")).await;

    let Ok(visible) = service.list_tasks(&alice, TaskQuery::default()).await else {
        panic!("listing should succeed");
    };
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id(), alice_task.id());

    let Ok(done) = service
        .list_tasks(
            &alice,
            TaskQuery {
                status: Some(TaskStatus::Done),
                ..TaskQuery::default()
            },
        )
        .await
    else {
        panic!("listing should succeed");
    };
    assert!(done.is_empty());
}

#[tokio::test]
async fn assign_users_requires_edit_rule_and_assign_capability() {
    let store = Arc::new(FakeStore::default());
    let creator = store.seed_user_with(&[Capability::CreateTasks]);
    let helper = store.seed_user_with(&[]);
    let service = service(&store);
    let task = create_task(&store, &creator, titled("Pair up")).await;

    assert!(matches!(
        service
            .assign_users(&creator, task.id(), vec![user_id_of(&helper)])
            .await,
        Err(AppError::Forbidden(_))
    ));

    let dispatcher = store.seed_user_with(&[Capability::AssignTasksToUser]);
    assert!(matches!(
        service
            .assign_users(&dispatcher, task.id(), vec![user_id_of(&helper)])
            .await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn assign_users_rejects_unknown_assignee() {
    let store = Arc::new(FakeStore::default());
    let creator = store.seed_user_with(&[Capability::CreateTasks, Capability::AssignTasksToUser]);
    let service = service(&store);
    let task = create_task(&store, &creator, titled("Pair up")).await;

    let result = service
        .assign_users(&creator, task.id(), vec![tasklane_domain::UserId::new()])
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn move_to_project_and_back_out() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(&[
        Capability::CreateProjects,
        Capability::CreateTasks,
        Capability::AssignTasksToProject,
    ]);
    let service = service(&store);
    let project = create_project(&store, &actor).await;
    let task = create_task(&store, &actor, titled("Migrate")).await;

    let Ok(moved) = service
        .move_to_project(&actor, task.id(), Some(project.id()))
        .await
    else {
        panic!("move should succeed");
    };
    assert_eq!(moved.project_id(), Some(project.id()));

    let Ok(detached) = service.move_to_project(&actor, task.id(), None).await else {
        panic!("detach should succeed");
    };
    assert_eq!(detached.project_id(), None);
}

#[tokio::test]
async fn deleting_project_keeps_its_tasks() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(&[
        Capability::CreateProjects,
        Capability::DeleteProjects,
        Capability::CreateTasks,
        Capability::AssignTasksToProject,
    ]);
    let project = create_project(&store, &actor).await;
    let task = create_task(
        &store,
        &actor,
        CreateTaskInput {
            project_id: Some(project.id()),
            ..titled("Survivor")
        },
    )
    .await;

    assert!(
        project_service(&store)
            .delete_project(&actor, project.id())
            .await
            .is_ok()
    );

    let Ok(task) = service(&store).get_task(&actor, task.id()).await else {
        panic!("task should survive");
    };
    assert_eq!(task.project_id(), None);
}

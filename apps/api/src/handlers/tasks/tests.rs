use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use tasklane_core::{AppError, UserIdentity};
use tasklane_domain::{Capability, CapabilitySet};

use crate::dto::{
    AddTeamLeadRequest, ChangeTaskStatusRequest, CreateTaskRequest, MoveTaskRequest,
    ProjectRequest, TaskListQuery, TaskResponse,
};
use crate::error::ApiError;
use crate::handlers::projects;
use crate::handlers::test_support::TestApp;

use super::{
    change_task_status_handler, create_task_handler, delete_task_handler, get_task_handler,
    list_tasks_handler, move_task_handler,
};

async fn create_task(
    app: &TestApp,
    actor: &UserIdentity,
    title: &str,
    project_id: Option<String>,
) -> TaskResponse {
    let Ok((status, Json(task))) = create_task_handler(
        State(app.state.clone()),
        Extension(actor.clone()),
        Json(CreateTaskRequest {
            title: title.to_owned(),
            description: None,
            project_id,
            assignee_ids: Vec::new(),
        }),
    )
    .await
    else {
        panic!("task '{title}' should be created");
    };
    assert_eq!(status, StatusCode::CREATED);
    task
}

async fn visible_titles(app: &TestApp, actor: &UserIdentity, query: TaskListQuery) -> Vec<String> {
    list_tasks_handler(State(app.state.clone()), Extension(actor.clone()), Query(query))
        .await
        .map(|Json(tasks)| tasks.into_iter().map(|task| task.title).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn unrelated_users_cannot_see_tasks() {
    let app = TestApp::new().await;
    let creators = app
        .role("Creators", CapabilitySet::empty().with(Capability::CreateTasks))
        .await;
    let author = app.member("author@acme.test", vec![creators]).await;
    let outsider = app.member("outsider@acme.test", vec![creators]).await;

    let task = create_task(&app, &author, "Write launch notes", None).await;
    assert_eq!(task.status, "todo");
    assert_eq!(task.created_by, author.subject());

    let own = get_task_handler(
        State(app.state.clone()),
        Extension(author.clone()),
        Path(task.task_id.clone()),
    )
    .await;
    assert!(own.is_ok());

    let foreign = get_task_handler(
        State(app.state.clone()),
        Extension(outsider.clone()),
        Path(task.task_id.clone()),
    )
    .await;
    assert!(matches!(foreign, Err(ApiError(AppError::Forbidden(_)))));
    assert!(
        visible_titles(&app, &outsider, TaskListQuery::default())
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn team_leads_with_read_all_tasks_see_project_tasks() {
    let app = TestApp::new().await;
    let planners = app
        .role(
            "Planners",
            CapabilitySet::empty()
                .with(Capability::CreateTasks)
                .with(Capability::AssignTasksToProject),
        )
        .await;
    let leads = app
        .role("Leads", CapabilitySet::empty().with(Capability::ReadAllTasks))
        .await;
    let planner = app.member("planner@acme.test", vec![planners]).await;
    let lead = app.member("lead@acme.test", vec![leads]).await;

    let Ok((_, Json(project))) = projects::create_project_handler(
        State(app.state.clone()),
        Extension(app.admin.clone()),
        Json(ProjectRequest {
            name: "Apollo".to_owned(),
            description: Some("Moonshot".to_owned()),
        }),
    )
    .await
    else {
        panic!("administrator should create projects");
    };

    create_task(&app, &planner, "Fuel check", Some(project.project_id.clone())).await;
    create_task(&app, &planner, "Loose end", None).await;
    assert!(
        visible_titles(&app, &lead, TaskListQuery::default())
            .await
            .is_empty()
    );

    let added = projects::add_team_lead_handler(
        State(app.state.clone()),
        Extension(app.admin.clone()),
        Path(project.project_id.clone()),
        Json(AddTeamLeadRequest {
            user_id: lead.subject().to_owned(),
        }),
    )
    .await;
    let team_leads = added
        .map(|Json(project)| project.team_lead_ids)
        .unwrap_or_default();
    assert_eq!(team_leads.len(), 2);
    assert!(team_leads.contains(&lead.subject().to_owned()));

    assert_eq!(
        visible_titles(&app, &lead, TaskListQuery::default()).await,
        vec!["Fuel check".to_owned()]
    );
    assert_eq!(
        visible_titles(
            &app,
            &planner,
            TaskListQuery {
                project_id: Some(project.project_id),
                status: None,
            },
        )
        .await,
        vec!["Fuel check".to_owned()]
    );
}

#[tokio::test]
async fn project_placement_requires_assign_to_project() {
    let app = TestApp::new().await;
    let creators = app
        .role("Creators", CapabilitySet::empty().with(Capability::CreateTasks))
        .await;
    let author = app.member("author@acme.test", vec![creators]).await;
    let Ok((_, Json(project))) = projects::create_project_handler(
        State(app.state.clone()),
        Extension(app.admin.clone()),
        Json(ProjectRequest {
            name: "Gemini".to_owned(),
            description: None,
        }),
    )
    .await
    else {
        panic!("administrator should create projects");
    };

    let placed = create_task_handler(
        State(app.state.clone()),
        Extension(author.clone()),
        Json(CreateTaskRequest {
            title: "Orbit".to_owned(),
            description: None,
            project_id: Some(project.project_id.clone()),
            assignee_ids: Vec::new(),
        }),
    )
    .await;
    assert!(matches!(placed, Err(ApiError(AppError::Forbidden(_)))));

    let task = create_task(&app, &app.admin, "Dock", Some(project.project_id)).await;
    let moved = move_task_handler(
        State(app.state.clone()),
        Extension(app.admin.clone()),
        Path(task.task_id),
        Json(MoveTaskRequest { project_id: None }),
    )
    .await;
    assert_eq!(moved.map(|Json(task)| task.project_id).ok(), Some(None));
}

#[tokio::test]
async fn status_changes_validate_the_status_name() {
    let app = TestApp::new().await;
    let creators = app
        .role("Creators", CapabilitySet::empty().with(Capability::CreateTasks))
        .await;
    let author = app.member("author@acme.test", vec![creators]).await;
    let task = create_task(&app, &author, "Ship it", None).await;

    let change = |status: &str| {
        change_task_status_handler(
            State(app.state.clone()),
            Extension(author.clone()),
            Path(task.task_id.clone()),
            Json(ChangeTaskStatusRequest {
                status: status.to_owned(),
            }),
        )
    };

    let started = change("in_progress").await;
    assert_eq!(
        started.map(|Json(task)| task.status).ok(),
        Some("in_progress".to_owned())
    );
    assert!(matches!(
        change("archived").await,
        Err(ApiError(AppError::Validation(_)))
    ));

    let filtered = visible_titles(
        &app,
        &author,
        TaskListQuery {
            project_id: None,
            status: Some("in_progress".to_owned()),
        },
    )
    .await;
    assert_eq!(filtered, vec!["Ship it".to_owned()]);
}

#[tokio::test]
async fn deleting_requires_delete_tasks_even_for_the_creator() {
    let app = TestApp::new().await;
    let creators = app
        .role("Creators", CapabilitySet::empty().with(Capability::CreateTasks))
        .await;
    let author = app.member("author@acme.test", vec![creators]).await;
    let task = create_task(&app, &author, "Temporary", None).await;

    let denied = delete_task_handler(
        State(app.state.clone()),
        Extension(author),
        Path(task.task_id.clone()),
    )
    .await;
    assert!(matches!(denied, Err(ApiError(AppError::Forbidden(_)))));

    let deleted = delete_task_handler(
        State(app.state.clone()),
        Extension(app.admin.clone()),
        Path(task.task_id),
    )
    .await;
    assert_eq!(deleted.ok(), Some(StatusCode::NO_CONTENT));
}

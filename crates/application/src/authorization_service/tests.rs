use std::sync::Arc;

use tasklane_core::{AppError, TenantId, UserIdentity};
use tasklane_domain::{Capability, Project, ProjectId, Task, TaskAction, TaskId, TaskTarget};

use crate::test_support::{FakeStore, user_id_of};

#[tokio::test]
async fn require_capability_allows_granted_subject() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(&[Capability::ReadProjects]);

    let result = store
        .authorization_service()
        .require_capability(&actor, Capability::ReadProjects)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn require_capability_denies_missing_grant() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(&[Capability::ReadProjects]);

    let result = store
        .authorization_service()
        .require_capability(&actor, Capability::DeleteProjects)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn authorize_fails_closed_on_unknown_capability() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(Capability::all());

    let granted = store
        .authorization_service()
        .authorize(&actor, "can_launch_rockets")
        .await;
    assert!(matches!(granted, Ok(false)));
}

#[tokio::test]
async fn authorize_accepts_permission_names() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(&[Capability::EditTasks]);
    let service = store.authorization_service();

    assert!(matches!(
        service.authorize(&actor, "perm_can_edit_tasks").await,
        Ok(true)
    ));
    assert!(matches!(
        service.authorize(&actor, "can_edit_tasks").await,
        Ok(true)
    ));
    assert!(matches!(
        service.authorize(&actor, "can_delete_tasks").await,
        Ok(false)
    ));
}

#[tokio::test]
async fn authorize_denies_inactive_and_unknown_accounts() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(Capability::all());
    store.set_active(&actor, false);
    let stranger = UserIdentity::new(
        tasklane_domain::UserId::new().to_string(),
        "Stranger",
        None,
        store.tenant_id(),
    );
    let service = store.authorization_service();

    assert!(matches!(
        service.authorize(&actor, "can_read_users").await,
        Ok(false)
    ));
    assert!(matches!(
        service.authorize(&stranger, "can_read_users").await,
        Ok(false)
    ));
}

#[tokio::test]
async fn has_capability_surfaces_unknown_name_as_validation() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(&[]);

    let result = store
        .authorization_service()
        .has_capability(&actor, "can_fly")
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn resolve_principal_rejects_foreign_tenant() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(Capability::all());
    let foreign = UserIdentity::new(actor.subject(), "Elsewhere", None, TenantId::new());

    let result = store
        .authorization_service()
        .resolve_principal(&foreign)
        .await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn effective_capabilities_cover_whole_catalog() {
    let store = Arc::new(FakeStore::default());
    let actor = store.seed_user_with(&[Capability::CreateTasks]);

    let Ok(flags) = store
        .authorization_service()
        .effective_capabilities(&actor)
        .await
    else {
        panic!("capabilities should resolve");
    };

    assert_eq!(flags.len(), Capability::all().len());
    assert_eq!(flags.values().filter(|granted| **granted).count(), 1);
    assert_eq!(flags.get(&Capability::CreateTasks), Some(&true));
}

#[tokio::test]
async fn require_task_action_reports_forbidden() {
    let store = Arc::new(FakeStore::default());
    let owner = store.seed_user_with(&[]);
    let stranger = store.seed_user_with(&[Capability::EditTasks]);
    let service = store.authorization_service();

    let Ok(project) = Project::new(ProjectId::new(), "Ops", None, user_id_of(&owner)) else {
        panic!("project should be valid");
    };
    let Ok(task) = Task::new(
        TaskId::new(),
        "Rotate keys",
        None,
        user_id_of(&owner),
        Some(project.id()),
    ) else {
        panic!("task should be valid");
    };
    let target = TaskTarget::new(&task, Some(&project));

    let Ok(owner_principal) = service.resolve_principal(&owner).await else {
        panic!("owner should resolve");
    };
    let Ok(stranger_principal) = service.resolve_principal(&stranger).await else {
        panic!("stranger should resolve");
    };

    assert!(
        service
            .require_task_action(&owner_principal, TaskAction::Edit, Some(&target))
            .is_ok()
    );
    assert!(matches!(
        service.require_task_action(&stranger_principal, TaskAction::Edit, Some(&target)),
        Err(AppError::Forbidden(_))
    ));
}

//! In-memory application state for handler tests.

use std::sync::Arc;

use tasklane_application::{
    BootstrapAdministratorInput, CreateUserInput, RoleInput, UserService,
};
use tasklane_core::UserIdentity;
use tasklane_domain::{CapabilitySet, RoleId};
use tasklane_infrastructure::InMemoryStore;

use crate::api_services::{ServicePorts, build_app_state};
use crate::state::AppState;

pub(crate) const PASSWORD: &str = "kestrel-orbit-42";
pub(crate) const BOOTSTRAP_TOKEN: &str = "bootstrap-secret";

pub(crate) struct TestApp {
    pub(crate) state: AppState,
    pub(crate) admin: UserIdentity,
}

impl TestApp {
    /// Builds the state and bootstraps an administrator.
    pub(crate) async fn new() -> Self {
        let state = empty_state();
        let Ok(admin) = state
            .user_service
            .bootstrap_administrator(BootstrapAdministratorInput {
                tenant_name: "Acme".to_owned(),
                email: "admin@acme.test".to_owned(),
                display_name: "Admin".to_owned(),
                password: PASSWORD.to_owned(),
            })
            .await
        else {
            panic!("bootstrap should succeed on an empty store");
        };

        Self {
            admin: UserService::session_identity(&admin),
            state,
        }
    }

    pub(crate) async fn role(&self, name: &str, capabilities: CapabilitySet) -> RoleId {
        let Ok(role) = self
            .state
            .role_service
            .create_role(
                &self.admin,
                RoleInput {
                    name: name.to_owned(),
                    capabilities,
                },
            )
            .await
        else {
            panic!("role fixture should be created");
        };
        role.id()
    }

    pub(crate) async fn member(&self, email: &str, role_ids: Vec<RoleId>) -> UserIdentity {
        let Ok(user) = self
            .state
            .user_service
            .create_user(
                &self.admin,
                CreateUserInput {
                    email: email.to_owned(),
                    display_name: email.to_owned(),
                    password: PASSWORD.to_owned(),
                    role_ids,
                },
            )
            .await
        else {
            panic!("member fixture should be created");
        };
        UserService::session_identity(&user)
    }
}

/// State over an empty store, before any bootstrap.
pub(crate) fn empty_state() -> AppState {
    build_app_state(
        ServicePorts::in_memory(Arc::new(InMemoryStore::new())),
        "http://localhost:3000".to_owned(),
        BOOTSTRAP_TOKEN.to_owned(),
    )
}

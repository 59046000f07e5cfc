//! Shared fake ports for service tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tasklane_core::{AppError, AppResult, TenantId, UserIdentity};
use tasklane_domain::{
    Capability, CapabilitySet, Principal, Project, ProjectId, Role, RoleId, Task, TaskId, UserId,
};

use crate::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    AuthTokenRepository, AuthorizationRepository, AuthorizationService, EmailService, NewUser,
    PasswordHasher, PasswordResetTokenRecord, ProjectRepository, RoleRepository, TaskQuery,
    TaskRepository, TenantRepository, UserRecord, UserRepository,
};

/// Password every seeded user signs in with.
pub(crate) const SEEDED_PASSWORD: &str = "correct horse battery";

#[derive(Debug, Clone)]
pub(crate) struct FakeToken {
    pub(crate) record: PasswordResetTokenRecord,
    pub(crate) token_hash: String,
    pub(crate) used: bool,
    pub(crate) created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Default)]
pub(crate) struct FakeState {
    pub(crate) users: HashMap<UserId, UserRecord>,
    pub(crate) roles: Vec<(TenantId, Role)>,
    pub(crate) projects: HashMap<ProjectId, (TenantId, Project)>,
    pub(crate) tasks: HashMap<TaskId, (TenantId, Task)>,
    pub(crate) audit: Vec<AuditEvent>,
    pub(crate) permissions: BTreeSet<String>,
    pub(crate) tokens: Vec<FakeToken>,
    pub(crate) emails: Vec<(String, String)>,
    pub(crate) tenants: Vec<TenantId>,
    seeded: usize,
}

/// In-process fake implementing every application port.
#[derive(Default)]
pub(crate) struct FakeStore {
    tenant_id: TenantId,
    state: Mutex<FakeState>,
}

pub(crate) fn user_id_of(identity: &UserIdentity) -> UserId {
    identity.subject().parse().unwrap_or_default()
}

impl FakeStore {
    pub(crate) fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub(crate) fn authorization_service(self: &Arc<Self>) -> AuthorizationService {
        AuthorizationService::new(self.clone())
    }

    /// Seeds an active user holding one role with the given capabilities.
    pub(crate) fn seed_user_with(&self, capabilities: &[Capability]) -> UserIdentity {
        let mut state = self.state();
        state.seeded += 1;
        let sequence = state.seeded;

        let role = Role::new(
            RoleId::new(),
            format!("seeded-role-{sequence}"),
            capabilities.iter().copied().collect::<CapabilitySet>(),
        )
        .unwrap_or_else(|error| panic!("seeded role should be valid: {error}"));
        let user = UserRecord {
            id: UserId::new(),
            tenant_id: self.tenant_id,
            email: format!("user{sequence}@example.com"),
            display_name: format!("User {sequence}"),
            password_hash: format!("hashed:{SEEDED_PASSWORD}"),
            is_active: true,
            role_ids: vec![role.id()],
        };

        state.roles.push((self.tenant_id, role));
        state.users.insert(user.id, user.clone());
        UserIdentity::new(
            user.id.to_string(),
            user.display_name,
            Some(user.email),
            self.tenant_id,
        )
    }

    pub(crate) fn set_active(&self, identity: &UserIdentity, active: bool) {
        if let Some(user) = self.state().users.get_mut(&user_id_of(identity)) {
            user.is_active = active;
        }
    }

    pub(crate) fn role_ids_of(&self, identity: &UserIdentity) -> Vec<RoleId> {
        self.state()
            .users
            .get(&user_id_of(identity))
            .map(|user| user.role_ids.clone())
            .unwrap_or_default()
    }

    pub(crate) fn permission_names(&self) -> Vec<String> {
        self.state().permissions.iter().cloned().collect()
    }

    pub(crate) fn audit_actions(&self) -> Vec<&'static str> {
        self.state()
            .audit
            .iter()
            .map(|event| event.action.as_str())
            .collect()
    }
}

#[async_trait]
impl AuthorizationRepository for FakeStore {
    async fn find_principal(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Option<Principal>> {
        let state = self.state();
        let Some(user) = state
            .users
            .get(&user_id)
            .filter(|user| user.tenant_id == tenant_id)
        else {
            return Ok(None);
        };

        let roles = state
            .roles
            .iter()
            .filter(|(role_tenant, role)| {
                *role_tenant == tenant_id && user.role_ids.contains(&role.id())
            })
            .map(|(_, role)| role.clone())
            .collect();
        Ok(Some(Principal::new(user.id, user.is_active, roles)))
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn count_users(&self) -> AppResult<u64> {
        Ok(self.state().users.len() as u64)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let email = email.to_lowercase();
        Ok(self
            .state()
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Option<UserRecord>> {
        Ok(self
            .state()
            .users
            .get(&user_id)
            .filter(|user| user.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_users(&self, tenant_id: TenantId) -> AppResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self
            .state()
            .users
            .values()
            .filter(|user| user.tenant_id == tenant_id)
            .cloned()
            .collect();
        users.sort_by(|left, right| left.email.cmp(&right.email));
        Ok(users)
    }

    async fn create_user(&self, user: NewUser, role_ids: &[RoleId]) -> AppResult<UserRecord> {
        let mut state = self.state();
        if state.users.values().any(|known| known.email == user.email) {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        let record = UserRecord {
            id: user.id,
            tenant_id: user.tenant_id,
            email: user.email,
            display_name: user.display_name,
            password_hash: user.password_hash,
            is_active: user.is_active,
            role_ids: role_ids.to_vec(),
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_profile(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        display_name: &str,
        is_active: bool,
    ) -> AppResult<UserRecord> {
        let mut state = self.state();
        let user = state
            .users
            .get_mut(&user_id)
            .filter(|user| user.tenant_id == tenant_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        user.display_name = display_name.to_owned();
        user.is_active = is_active;
        Ok(user.clone())
    }

    async fn delete_user(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<()> {
        let mut state = self.state();
        if state
            .users
            .get(&user_id)
            .is_some_and(|user| user.tenant_id == tenant_id)
        {
            state.users.remove(&user_id);
        }
        Ok(())
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        let mut state = self.state();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        user.password_hash = password_hash.to_owned();
        Ok(())
    }

    async fn assign_role(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let mut state = self.state();
        if let Some(user) = state
            .users
            .get_mut(&user_id)
            .filter(|user| user.tenant_id == tenant_id)
            && !user.role_ids.contains(&role_id)
        {
            user.role_ids.push(role_id);
        }
        Ok(())
    }

    async fn unassign_role(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let mut state = self.state();
        if let Some(user) = state
            .users
            .get_mut(&user_id)
            .filter(|user| user.tenant_id == tenant_id)
        {
            user.role_ids.retain(|known| *known != role_id);
        }
        Ok(())
    }
}

#[async_trait]
impl TenantRepository for FakeStore {
    async fn create_tenant(&self, _name: &str) -> AppResult<TenantId> {
        let tenant_id = TenantId::new();
        self.state().tenants.push(tenant_id);
        Ok(tenant_id)
    }
}

#[async_trait]
impl RoleRepository for FakeStore {
    async fn list_roles(&self, tenant_id: TenantId) -> AppResult<Vec<Role>> {
        Ok(self
            .state()
            .roles
            .iter()
            .filter(|(role_tenant, _)| *role_tenant == tenant_id)
            .map(|(_, role)| role.clone())
            .collect())
    }

    async fn find_role(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .state()
            .roles
            .iter()
            .find(|(role_tenant, role)| *role_tenant == tenant_id && role.id() == role_id)
            .map(|(_, role)| role.clone()))
    }

    async fn create_role(&self, tenant_id: TenantId, role: &Role) -> AppResult<()> {
        let mut state = self.state();
        if state.roles.iter().any(|(role_tenant, known)| {
            *role_tenant == tenant_id && known.name().as_str() == role.name().as_str()
        }) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }
        state.roles.push((tenant_id, role.clone()));
        Ok(())
    }

    async fn update_role(&self, tenant_id: TenantId, role: &Role) -> AppResult<()> {
        let mut state = self.state();
        if state.roles.iter().any(|(role_tenant, known)| {
            *role_tenant == tenant_id
                && known.id() != role.id()
                && known.name().as_str() == role.name().as_str()
        }) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        let slot = state
            .roles
            .iter_mut()
            .find(|(role_tenant, known)| *role_tenant == tenant_id && known.id() == role.id())
            .ok_or_else(|| AppError::NotFound(format!("role '{}' does not exist", role.id())))?;
        slot.1 = role.clone();
        Ok(())
    }

    async fn delete_role(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<()> {
        self.state()
            .roles
            .retain(|(role_tenant, role)| !(*role_tenant == tenant_id && role.id() == role_id));
        Ok(())
    }

    async fn count_role_holders(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<u64> {
        Ok(self
            .state()
            .users
            .values()
            .filter(|user| user.tenant_id == tenant_id && user.role_ids.contains(&role_id))
            .count() as u64)
    }

    async fn ensure_permission_catalog(&self, catalog: &[Capability]) -> AppResult<()> {
        let mut state = self.state();
        for capability in catalog {
            state.permissions.insert(capability.permission_name());
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for FakeStore {
    async fn list_projects(&self, tenant_id: TenantId) -> AppResult<Vec<Project>> {
        Ok(self
            .state()
            .projects
            .values()
            .filter(|(project_tenant, _)| *project_tenant == tenant_id)
            .map(|(_, project)| project.clone())
            .collect())
    }

    async fn find_project(
        &self,
        tenant_id: TenantId,
        project_id: ProjectId,
    ) -> AppResult<Option<Project>> {
        Ok(self
            .state()
            .projects
            .get(&project_id)
            .filter(|(project_tenant, _)| *project_tenant == tenant_id)
            .map(|(_, project)| project.clone()))
    }

    async fn create_project(&self, tenant_id: TenantId, project: &Project) -> AppResult<()> {
        self.state()
            .projects
            .insert(project.id(), (tenant_id, project.clone()));
        Ok(())
    }

    async fn save_project(&self, tenant_id: TenantId, project: &Project) -> AppResult<()> {
        self.create_project(tenant_id, project).await
    }

    async fn delete_project(&self, tenant_id: TenantId, project_id: ProjectId) -> AppResult<()> {
        let mut state = self.state();
        state.projects.remove(&project_id);
        for (task_tenant, task) in state.tasks.values_mut() {
            if *task_tenant == tenant_id && task.project_id() == Some(project_id) {
                task.set_project(None);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FakeStore {
    async fn list_tasks(&self, tenant_id: TenantId, query: TaskQuery) -> AppResult<Vec<Task>> {
        Ok(self
            .state()
            .tasks
            .values()
            .filter(|(task_tenant, task)| {
                *task_tenant == tenant_id
                    && query
                        .project_id
                        .is_none_or(|project_id| task.project_id() == Some(project_id))
                    && query.status.is_none_or(|status| task.status() == status)
            })
            .map(|(_, task)| task.clone())
            .collect())
    }

    async fn find_task(&self, tenant_id: TenantId, task_id: TaskId) -> AppResult<Option<Task>> {
        Ok(self
            .state()
            .tasks
            .get(&task_id)
            .filter(|(task_tenant, _)| *task_tenant == tenant_id)
            .map(|(_, task)| task.clone()))
    }

    async fn create_task(&self, tenant_id: TenantId, task: &Task) -> AppResult<()> {
        self.state()
            .tasks
            .insert(task.id(), (tenant_id, task.clone()));
        Ok(())
    }

    async fn save_task(&self, tenant_id: TenantId, task: &Task) -> AppResult<()> {
        self.create_task(tenant_id, task).await
    }

    async fn delete_task(&self, _tenant_id: TenantId, task_id: TaskId) -> AppResult<()> {
        self.state().tasks.remove(&task_id);
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for FakeStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state().audit.push(event);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for FakeStore {
    async fn list_recent_entries(
        &self,
        tenant_id: TenantId,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .state()
            .audit
            .iter()
            .rev()
            .filter(|event| event.tenant_id == tenant_id)
            .skip(query.offset)
            .take(query.limit)
            .enumerate()
            .map(|(index, event)| AuditLogEntry {
                event_id: index.to_string(),
                subject: event.subject.clone(),
                action: event.action.as_str().to_owned(),
                resource_type: event.resource_type.clone(),
                resource_id: event.resource_id.clone(),
                detail: event.detail.clone(),
                created_at: chrono::Utc::now().to_rfc3339(),
            })
            .collect())
    }
}

#[async_trait]
impl AuthTokenRepository for FakeStore {
    async fn create_token(
        &self,
        user_id: UserId,
        email: &str,
        token_hash: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<uuid::Uuid> {
        let id = uuid::Uuid::new_v4();
        self.state().tokens.push(FakeToken {
            record: PasswordResetTokenRecord {
                id,
                user_id,
                email: email.to_owned(),
                expires_at,
            },
            token_hash: token_hash.to_owned(),
            used: false,
            created_at: chrono::Utc::now(),
        });
        Ok(id)
    }

    async fn consume_valid_token(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<PasswordResetTokenRecord>> {
        let now = chrono::Utc::now();
        let mut state = self.state();
        let token = state.tokens.iter_mut().find(|token| {
            token.token_hash == token_hash && !token.used && token.record.expires_at > now
        });
        Ok(token.map(|token| {
            token.used = true;
            token.record.clone()
        }))
    }

    async fn invalidate_tokens_for_user(&self, user_id: UserId) -> AppResult<()> {
        for token in self
            .state()
            .tokens
            .iter_mut()
            .filter(|token| token.record.user_id == user_id)
        {
            token.used = true;
        }
        Ok(())
    }

    async fn count_recent_tokens(
        &self,
        email: &str,
        since: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<i64> {
        Ok(self
            .state()
            .tokens
            .iter()
            .filter(|token| token.record.email == email && token.created_at >= since)
            .count() as i64)
    }
}

#[async_trait]
impl EmailService for FakeStore {
    async fn send_email(&self, to: &str, _subject: &str, text_body: &str) -> AppResult<()> {
        self.state()
            .emails
            .push((to.to_owned(), text_body.to_owned()));
        Ok(())
    }
}

impl PasswordHasher for FakeStore {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

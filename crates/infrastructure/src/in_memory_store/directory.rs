use super::*;

#[async_trait]
impl TenantRepository for InMemoryStore {
    async fn create_tenant(&self, name: &str) -> AppResult<TenantId> {
        let tenant_id = TenantId::new();
        self.tenants.write().await.insert(tenant_id, name.to_owned());
        Ok(tenant_id)
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryStore {
    async fn find_principal(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Option<Principal>> {
        let users = self.users.read().await;
        let Some(user) = users
            .get(&user_id)
            .filter(|user| user.tenant_id == tenant_id)
        else {
            return Ok(None);
        };

        let roles = self.roles.read().await;
        let assigned = user
            .role_ids
            .iter()
            .filter_map(|role_id| roles.get(role_id))
            .filter(|(role_tenant_id, _)| *role_tenant_id == tenant_id)
            .map(|(_, role)| role.clone())
            .collect();

        Ok(Some(Principal::new(user_id, user.is_active, assigned)))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn count_users(&self) -> AppResult<u64> {
        Ok(u64::try_from(self.users.read().await.len()).unwrap_or_default())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .get(&user_id)
            .filter(|user| user.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_users(&self, tenant_id: TenantId) -> AppResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self
            .users
            .read()
            .await
            .values()
            .filter(|user| user.tenant_id == tenant_id)
            .cloned()
            .collect();
        users.sort_by(|left, right| left.email.cmp(&right.email));
        Ok(users)
    }

    async fn create_user(&self, user: NewUser, role_ids: &[RoleId]) -> AppResult<UserRecord> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        let roles = self.roles.read().await;
        let mut assigned = Vec::new();
        for role_id in role_ids {
            let in_tenant = roles
                .get(role_id)
                .is_some_and(|(role_tenant_id, _)| *role_tenant_id == user.tenant_id);
            if in_tenant && !assigned.contains(role_id) {
                assigned.push(*role_id);
            }
        }

        let record = UserRecord {
            id: user.id,
            tenant_id: user.tenant_id,
            email: user.email.to_lowercase(),
            display_name: user.display_name,
            password_hash: user.password_hash,
            is_active: user.is_active,
            role_ids: assigned,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_profile(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        display_name: &str,
        is_active: bool,
    ) -> AppResult<UserRecord> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .filter(|user| user.tenant_id == tenant_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        display_name.clone_into(&mut user.display_name);
        user.is_active = is_active;
        Ok(user.clone())
    }

    async fn delete_user(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<()> {
        let mut users = self.users.write().await;
        if !users
            .get(&user_id)
            .is_some_and(|user| user.tenant_id == tenant_id)
        {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }
        users.remove(&user_id);
        drop(users);

        for (_, project) in self.projects.write().await.values_mut() {
            project.remove_team_lead(user_id);
        }
        for (_, task) in self.tasks.write().await.iter_mut() {
            let remaining: Vec<UserId> = task
                .assignee_ids()
                .iter()
                .copied()
                .filter(|assignee| *assignee != user_id)
                .collect();
            task.replace_assignees(remaining);
        }
        self.tokens
            .write()
            .await
            .retain(|token| token.record.user_id != user_id);

        Ok(())
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            password_hash.clone_into(&mut user.password_hash);
        }
        Ok(())
    }

    async fn assign_role(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let role_in_tenant = self
            .roles
            .read()
            .await
            .get(&role_id)
            .is_some_and(|(role_tenant_id, _)| *role_tenant_id == tenant_id);
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .filter(|user| user.tenant_id == tenant_id && role_in_tenant)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{user_id}' or role '{role_id}' does not exist"
                ))
            })?;

        if !user.role_ids.contains(&role_id) {
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
        if let Some(user) = self
            .users
            .write()
            .await
            .get_mut(&user_id)
            .filter(|user| user.tenant_id == tenant_id)
        {
            user.role_ids.retain(|held| *held != role_id);
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn list_roles(&self, tenant_id: TenantId) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .roles
            .read()
            .await
            .values()
            .filter(|(role_tenant_id, _)| *role_tenant_id == tenant_id)
            .map(|(_, role)| role.clone())
            .collect();
        roles.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(roles)
    }

    async fn find_role(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .get(&role_id)
            .filter(|(role_tenant_id, _)| *role_tenant_id == tenant_id)
            .map(|(_, role)| role.clone()))
    }

    async fn create_role(&self, tenant_id: TenantId, role: &Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        if name_taken(&roles, tenant_id, role) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        roles.insert(role.id(), (tenant_id, role.clone()));
        Ok(())
    }

    async fn update_role(&self, tenant_id: TenantId, role: &Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        if name_taken(&roles, tenant_id, role) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        let stored = roles
            .get_mut(&role.id())
            .filter(|(role_tenant_id, _)| *role_tenant_id == tenant_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{}' does not exist", role.id())))?;
        stored.1 = role.clone();
        Ok(())
    }

    async fn delete_role(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<()> {
        if self.count_role_holders(tenant_id, role_id).await? > 0 {
            return Err(AppError::Conflict(format!(
                "role '{role_id}' is still assigned to users"
            )));
        }

        let mut roles = self.roles.write().await;
        if !roles
            .get(&role_id)
            .is_some_and(|(role_tenant_id, _)| *role_tenant_id == tenant_id)
        {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist"
            )));
        }
        roles.remove(&role_id);
        Ok(())
    }

    async fn count_role_holders(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<u64> {
        let holders = self
            .users
            .read()
            .await
            .values()
            .filter(|user| user.tenant_id == tenant_id && user.role_ids.contains(&role_id))
            .count();
        Ok(u64::try_from(holders).unwrap_or_default())
    }

    async fn ensure_permission_catalog(&self, catalog: &[Capability]) -> AppResult<()> {
        let mut permissions = self.permissions.write().await;
        for capability in catalog {
            permissions.insert(
                capability.permission_name(),
                capability.description().to_owned(),
            );
        }
        Ok(())
    }
}

fn name_taken(roles: &HashMap<RoleId, (TenantId, Role)>, tenant_id: TenantId, role: &Role) -> bool {
    roles.values().any(|(role_tenant_id, existing)| {
        *role_tenant_id == tenant_id
            && existing.id() != role.id()
            && existing.name().as_str() == role.name().as_str()
    })
}

use super::*;

impl PostgresUserRepository {
    pub(super) async fn assign_role_impl(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT u.id, r.id
            FROM users u
            JOIN roles r ON r.tenant_id = u.tenant_id
            WHERE u.tenant_id = $1 AND u.id = $2 AND r.id = $3
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;

        if inserted.rows_affected() == 0 {
            let held = self
                .find_by_id_impl(tenant_id, user_id)
                .await?
                .is_some_and(|user| user.role_ids.contains(&role_id));
            if !held {
                return Err(AppError::NotFound(format!(
                    "user '{user_id}' or role '{role_id}' does not exist"
                )));
            }
        }

        Ok(())
    }

    pub(super) async fn unassign_role_impl(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM user_roles ur
            USING users u
            WHERE ur.user_id = u.id
              AND u.tenant_id = $1
              AND ur.user_id = $2
              AND ur.role_id = $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to unassign role: {error}")))?;

        Ok(())
    }
}

use super::*;

impl PostgresUserRepository {
    pub(super) async fn create_user_impl(
        &self,
        user: NewUser,
        role_ids: &[RoleId],
    ) -> AppResult<UserRecord> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO users (id, tenant_id, email, display_name, password_hash, is_active)
            VALUES ($1, $2, LOWER($3), $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.tenant_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.display_name.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.is_active)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                "create user",
                &format!("email '{}' is already registered", user.email),
            )
        })?;

        let role_uuids = role_ids.iter().map(RoleId::as_uuid).collect::<Vec<_>>();
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, r.id
            FROM roles r
            WHERE r.tenant_id = $2 AND r.id = ANY($3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.tenant_id.as_uuid())
        .bind(role_uuids)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign user roles: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit user creation: {error}"))
        })?;

        self.require_user(user.tenant_id, user.id).await
    }

    pub(super) async fn update_profile_impl(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        display_name: &str,
        is_active: bool,
    ) -> AppResult<UserRecord> {
        let updated = sqlx::query(
            r#"
            UPDATE users
            SET display_name = $3, is_active = $4, updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(display_name)
        .bind(is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update user: {error}")))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        self.require_user(tenant_id, user_id).await
    }

    pub(super) async fn delete_user_impl(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM users
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete user: {error}")))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        Ok(())
    }

    pub(super) async fn update_password_impl(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update password: {error}")))?;

        Ok(())
    }
}

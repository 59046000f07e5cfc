use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use tasklane_application::ProjectRepository;
use tasklane_core::{AppError, AppResult, TenantId};
use tasklane_domain::{Project, ProjectId, UserId};

/// PostgreSQL-backed project repository.
#[derive(Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: uuid::Uuid,
    name: String,
    description: Option<String>,
    created_by: uuid::Uuid,
    team_lead_ids: Vec<uuid::Uuid>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Project::from_parts(
            ProjectId::from_uuid(row.id),
            row.name,
            row.description,
            UserId::from_uuid(row.created_by),
            row.team_lead_ids.into_iter().map(UserId::from_uuid),
        )
    }
}

const PROJECT_SELECT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.description,
        p.created_by,
        COALESCE(
            array_agg(tl.user_id) FILTER (WHERE tl.user_id IS NOT NULL),
            '{}'
        ) AS team_lead_ids
    FROM projects p
    LEFT JOIN project_team_leads tl ON tl.project_id = p.id
"#;

async fn replace_team_leads(
    transaction: &mut Transaction<'_, Postgres>,
    project: &Project,
) -> AppResult<()> {
    sqlx::query("DELETE FROM project_team_leads WHERE project_id = $1")
        .bind(project.id().as_uuid())
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear team leads: {error}")))?;

    let lead_ids = project
        .team_lead_ids()
        .iter()
        .map(UserId::as_uuid)
        .collect::<Vec<_>>();
    sqlx::query(
        r#"
        INSERT INTO project_team_leads (project_id, user_id)
        SELECT $1, UNNEST($2::UUID[])
        "#,
    )
    .bind(project.id().as_uuid())
    .bind(lead_ids)
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to store team leads: {error}")))?;

    Ok(())
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn list_projects(&self, tenant_id: TenantId) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "{PROJECT_SELECT} WHERE p.tenant_id = $1 GROUP BY p.id ORDER BY p.name, p.id"
        ))
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list projects: {error}")))?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn find_project(
        &self,
        tenant_id: TenantId,
        project_id: ProjectId,
    ) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "{PROJECT_SELECT} WHERE p.tenant_id = $1 AND p.id = $2 GROUP BY p.id"
        ))
        .bind(tenant_id.as_uuid())
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find project: {error}")))?;

        row.map(Project::try_from).transpose()
    }

    async fn create_project(&self, tenant_id: TenantId, project: &Project) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO projects (id, tenant_id, name, description, created_by)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(project.id().as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(project.name().as_str())
        .bind(project.description())
        .bind(project.created_by().as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create project: {error}")))?;

        replace_team_leads(&mut transaction, project).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit project creation: {error}"))
        })?;

        Ok(())
    }

    async fn save_project(&self, tenant_id: TenantId, project: &Project) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let updated = sqlx::query(
            r#"
            UPDATE projects
            SET name = $3, description = $4, updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(project.id().as_uuid())
        .bind(project.name().as_str())
        .bind(project.description())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update project: {error}")))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "project '{}' does not exist",
                project.id()
            )));
        }

        replace_team_leads(&mut transaction, project).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit project update: {error}"))
        })?;

        Ok(())
    }

    async fn delete_project(&self, tenant_id: TenantId, project_id: ProjectId) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM projects
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(project_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete project: {error}")))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' does not exist"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;

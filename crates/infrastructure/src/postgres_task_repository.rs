use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use tasklane_application::{TaskQuery, TaskRepository};
use tasklane_core::{AppError, AppResult, TenantId};
use tasklane_domain::{ProjectId, Task, TaskId, TaskStatus, UserId};

/// PostgreSQL-backed task repository.
#[derive(Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: uuid::Uuid,
    title: String,
    description: Option<String>,
    status: String,
    created_by: uuid::Uuid,
    project_id: Option<uuid::Uuid>,
    assignee_ids: Vec<uuid::Uuid>,
}

impl TryFrom<TaskRow> for Task {
    type Error = AppError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<TaskStatus>().map_err(|_| {
            AppError::Internal(format!(
                "task '{}' has unknown status '{}'",
                row.id, row.status
            ))
        })?;

        Task::from_parts(
            TaskId::from_uuid(row.id),
            row.title,
            row.description,
            status,
            UserId::from_uuid(row.created_by),
            row.assignee_ids.into_iter().map(UserId::from_uuid),
            row.project_id.map(ProjectId::from_uuid),
        )
    }
}

const TASK_SELECT: &str = r#"
    SELECT
        t.id,
        t.title,
        t.description,
        t.status,
        t.created_by,
        t.project_id,
        COALESCE(
            array_agg(ta.user_id) FILTER (WHERE ta.user_id IS NOT NULL),
            '{}'
        ) AS assignee_ids
    FROM tasks t
    LEFT JOIN task_assignees ta ON ta.task_id = t.id
"#;

async fn replace_assignees(
    transaction: &mut Transaction<'_, Postgres>,
    task: &Task,
) -> AppResult<()> {
    sqlx::query("DELETE FROM task_assignees WHERE task_id = $1")
        .bind(task.id().as_uuid())
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear assignees: {error}")))?;

    let assignee_ids = task
        .assignee_ids()
        .iter()
        .map(UserId::as_uuid)
        .collect::<Vec<_>>();
    sqlx::query(
        r#"
        INSERT INTO task_assignees (task_id, user_id)
        SELECT $1, UNNEST($2::UUID[])
        "#,
    )
    .bind(task.id().as_uuid())
    .bind(assignee_ids)
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to store assignees: {error}")))?;

    Ok(())
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn list_tasks(&self, tenant_id: TenantId, query: TaskQuery) -> AppResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            {TASK_SELECT}
            WHERE t.tenant_id = $1
                AND ($2::UUID IS NULL OR t.project_id = $2)
                AND ($3::TEXT IS NULL OR t.status = $3)
            GROUP BY t.id
            ORDER BY t.created_at, t.id
            "#
        ))
        .bind(tenant_id.as_uuid())
        .bind(query.project_id.map(|project_id| project_id.as_uuid()))
        .bind(query.status.map(|status| status.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list tasks: {error}")))?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn find_task(&self, tenant_id: TenantId, task_id: TaskId) -> AppResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "{TASK_SELECT} WHERE t.tenant_id = $1 AND t.id = $2 GROUP BY t.id"
        ))
        .bind(tenant_id.as_uuid())
        .bind(task_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find task: {error}")))?;

        row.map(Task::try_from).transpose()
    }

    async fn create_task(&self, tenant_id: TenantId, task: &Task) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO tasks (id, tenant_id, title, description, status, created_by, project_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(task.id().as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(task.title().as_str())
        .bind(task.description())
        .bind(task.status().as_str())
        .bind(task.created_by().as_uuid())
        .bind(task.project_id().map(|project_id| project_id.as_uuid()))
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create task: {error}")))?;

        replace_assignees(&mut transaction, task).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit task creation: {error}"))
        })?;

        Ok(())
    }

    async fn save_task(&self, tenant_id: TenantId, task: &Task) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let updated = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $3,
                description = $4,
                status = $5,
                project_id = $6,
                updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(task.id().as_uuid())
        .bind(task.title().as_str())
        .bind(task.description())
        .bind(task.status().as_str())
        .bind(task.project_id().map(|project_id| project_id.as_uuid()))
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update task: {error}")))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "task '{}' does not exist",
                task.id()
            )));
        }

        replace_assignees(&mut transaction, task).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit task update: {error}"))
        })?;

        Ok(())
    }

    async fn delete_task(&self, tenant_id: TenantId, task_id: TaskId) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(task_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete task: {error}")))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("task '{task_id}' does not exist")));
        }

        Ok(())
    }
}

use tasklane_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Maps unique and foreign key violations to `Conflict`.
pub(crate) fn conflict_or_internal(error: sqlx::Error, operation: &str, conflict: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && matches!(
            database_error.code().as_deref(),
            Some(UNIQUE_VIOLATION | FOREIGN_KEY_VIOLATION)
        )
    {
        return AppError::Conflict(conflict.to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

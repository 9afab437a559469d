use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(i64),

    #[error("Invalid filter parameters: {0}")]
    InvalidFilter(ValidationErrors),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TaskResult<T> = Result<T, TaskError>;

/// Convert TaskError to AppError for standardized error responses
impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => AppError::NotFound(format!("Task {} not found", id)),
            TaskError::InvalidFilter(errors) | TaskError::Validation(errors) => {
                AppError::ValidationError(errors)
            }
            TaskError::Database(msg) => AppError::Database(msg),
            TaskError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<sea_orm::DbErr> for TaskError {
    fn from(err: sea_orm::DbErr) -> Self {
        TaskError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use validator::ValidationError;

    #[test]
    fn test_status_codes() {
        let mut errors = ValidationErrors::new();
        errors.add("page", ValidationError::new("range"));

        let cases = [
            (TaskError::NotFound(9), StatusCode::NOT_FOUND),
            (
                TaskError::InvalidFilter(errors),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                TaskError::from(sea_orm::DbErr::Custom("connection reset".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                TaskError::Internal("oops".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_database_message_is_kept() {
        let error = TaskError::from(sea_orm::DbErr::Custom("connection reset".to_string()));
        match AppError::from(error) {
            AppError::Database(msg) => assert!(msg.contains("connection reset")),
            other => panic!("unexpected {other:?}"),
        }
    }
}

//! Integer id path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};

/// Extractor for positive `i64` path ids.
///
/// Anything that is not a positive integer yields a 400 `INVALID_ID`.
///
/// # Example
/// ```ignore
/// async fn get_task(IdPath(id): IdPath) -> String {
///     format!("Task ID: {}", id)
/// }
///
/// let app = Router::new().route("/tasks/{id}", get(get_task));
/// ```
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(IdPath(id)),
            _ => Err(AppError::InvalidId(raw).into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    async fn echo(IdPath(id): IdPath) -> String {
        id.to_string()
    }

    async fn status_for(uri: &str) -> StatusCode {
        Router::new()
            .route("/tasks/{id}", get(echo))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_valid_id() {
        assert_eq!(status_for("/tasks/42").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_numeric_and_non_positive_ids_are_rejected() {
        assert_eq!(status_for("/tasks/abc").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for("/tasks/0").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for("/tasks/-3").await, StatusCode::BAD_REQUEST);
    }
}

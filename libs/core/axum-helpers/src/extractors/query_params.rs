//! Query-string extractor that accepts repeated keys.

use crate::errors::AppError;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use serde::de::DeserializeOwned;

/// Deserializes the query string with `axum_extra::extract::Query`, so
/// `?status=a&status=b` fills a `Vec<String>`.
///
/// Values that fail to deserialize (e.g. `page=abc`) are rejected with a
/// 422 `INVALID_QUERY` response. Semantic validation is left to the caller.
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(QueryParams(value))
    }
}

//! Custom extractors for Axum handlers.
//!
//! Each extractor converts its rejection into an [`AppError`](crate::errors::AppError)
//! so clients always receive the standard `ErrorResponse` body.

pub mod id_path;
pub mod query_params;
pub mod validated_json;

pub use id_path::IdPath;
pub use query_params::QueryParams;
pub use validated_json::ValidatedJson;

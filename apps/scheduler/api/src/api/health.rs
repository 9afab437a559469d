//! Readiness handler backed by the configured task store.

use crate::state::{AppState, TaskStore};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use database::postgres::check_health;
use domain_tasks::TaskRepository;

/// Readiness check: pings PostgreSQL, or counts the in-memory store.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = match &state.store {
        TaskStore::Postgres(db) => {
            let ping: HealthCheckFuture<'_> =
                Box::pin(async move { check_health(db).await.map_err(|e| e.to_string()) });
            vec![("database", ping)]
        }
        TaskStore::Memory(repo) => {
            let count: HealthCheckFuture<'_> = Box::pin(async move {
                repo.count(&[])
                    .await
                    .map(|_| ())
                    .map_err(|e| format!("In-memory store failed: {}", e))
            });
            vec![("store", count)]
        }
    };

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}

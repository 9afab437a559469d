use axum::Router;
use domain_tasks::{PgTaskRepository, TaskService, handlers};

use crate::state::{AppState, TaskStore};

pub fn router(state: &AppState) -> Router {
    match &state.store {
        TaskStore::Postgres(db) => {
            let repository = PgTaskRepository::new(db.clone());
            handlers::router(TaskService::new(repository))
        }
        TaskStore::Memory(repository) => handlers::router(TaskService::new(repository.clone())),
    }
}

use domain_tasks::InMemoryTaskRepository;
use sea_orm::DatabaseConnection;

use crate::config::Config;

/// The task store the routers are built over
#[derive(Clone)]
pub enum TaskStore {
    Postgres(DatabaseConnection),
    Memory(InMemoryTaskRepository),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: TaskStore,
}

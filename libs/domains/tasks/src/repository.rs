use async_trait::async_trait;

use crate::error::TaskResult;
use crate::models::{CreateTask, Task, TaskPriority, UpdateTask};
use crate::query::{Predicate, TaskQuery};

/// Repository trait for Task persistence
///
/// The service and the query composer only see this trait; the in-memory
/// and PostgreSQL stores both implement it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create a new task; the store assigns the id and creation time
    async fn create(&self, input: CreateTask) -> TaskResult<Task>;

    async fn get_by_id(&self, id: i64) -> TaskResult<Option<Task>>;

    /// Update an existing task, `TaskError::NotFound` if it is missing
    async fn update(&self, id: i64, input: UpdateTask) -> TaskResult<Task>;

    /// Delete a task by ID, returning whether a row was removed
    async fn delete(&self, id: i64) -> TaskResult<bool>;

    /// Count tasks matching every predicate
    async fn count(&self, predicates: &[Predicate]) -> TaskResult<u64>;

    /// Matching tasks, sorted and windowed by `query`
    async fn list(&self, query: &TaskQuery) -> TaskResult<Vec<Task>>;

    /// Tasks per status over the whole store
    async fn status_counts(&self) -> TaskResult<Vec<(String, u64)>>;

    /// Tasks per priority over the whole store
    async fn priority_counts(&self) -> TaskResult<Vec<(TaskPriority, u64)>>;

    /// Tasks per tag; a task counts once for each tag it carries
    async fn tag_counts(&self) -> TaskResult<Vec<(String, u64)>>;
}

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::{
    error::{TaskError, TaskResult},
    models::{CreateTask, Task, TaskPriority, UpdateTask},
    query::{Predicate, TaskQuery, matches_all},
    repository::TaskRepository,
};

/// Process-local task store, used when no database is configured and in
/// handler tests.
#[derive(Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<BTreeMap<i64, Task>>>,
    last_id: Arc<AtomicI64>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert tasks exactly as given, ids included. Later creates continue
    /// after the highest id seen.
    pub async fn seed(&self, tasks: impl IntoIterator<Item = Task>) {
        let mut store = self.tasks.write().await;
        for task in tasks {
            self.last_id.fetch_max(task.id, Ordering::SeqCst);
            store.insert(task.id, task);
        }
    }
}

fn count_values<I>(values: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    counts.into_iter().collect()
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, input: CreateTask) -> TaskResult<Task> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let task = input.into_task(id, Utc::now());

        self.tasks.write().await.insert(id, task.clone());

        tracing::info!(task_id = id, "Created task");
        Ok(task)
    }

    async fn get_by_id(&self, id: i64) -> TaskResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn update(&self, id: i64, input: UpdateTask) -> TaskResult<Task> {
        let mut store = self.tasks.write().await;
        let task = store.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        task.apply_update(input, Utc::now());

        tracing::info!(task_id = id, "Updated task");
        Ok(task.clone())
    }

    async fn delete(&self, id: i64) -> TaskResult<bool> {
        let removed = self.tasks.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(task_id = id, "Deleted task");
        }
        Ok(removed)
    }

    async fn count(&self, predicates: &[Predicate]) -> TaskResult<u64> {
        let store = self.tasks.read().await;
        let count = store
            .values()
            .filter(|task| matches_all(predicates, task))
            .count();
        Ok(count as u64)
    }

    async fn list(&self, query: &TaskQuery) -> TaskResult<Vec<Task>> {
        let store = self.tasks.read().await;
        let mut matching: Vec<&Task> = store
            .values()
            .filter(|task| matches_all(&query.predicates, task))
            .collect();
        matching.sort_by(|a, b| query.sort.compare(a, b));

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn status_counts(&self) -> TaskResult<Vec<(String, u64)>> {
        let store = self.tasks.read().await;
        Ok(count_values(store.values().map(|t| t.status.clone())))
    }

    async fn priority_counts(&self) -> TaskResult<Vec<(TaskPriority, u64)>> {
        let store = self.tasks.read().await;
        let mut counts: BTreeMap<TaskPriority, u64> = BTreeMap::new();
        for task in store.values() {
            *counts.entry(task.priority).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn tag_counts(&self) -> TaskResult<Vec<(String, u64)>> {
        let store = self.tasks.read().await;
        Ok(count_values(
            store.values().flat_map(|t| t.tags.iter().cloned()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{SortField, SortOrder};
    use crate::models::STATUS_COMPLETED;
    use crate::query::TaskSort;

    fn create(title: &str, tags: &[&str]) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: None,
            status: "pending".to_string(),
            priority: TaskPriority::Medium,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_stable() {
        let repo = InMemoryTaskRepository::new();
        let a = repo.create(create("a", &[])).await.unwrap();
        let b = repo.create(create("b", &[])).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());
        let c = repo.create(create("c", &[])).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn test_seed_advances_sequence() {
        let repo = InMemoryTaskRepository::new();
        let seeded = create("seeded", &[]).into_task(10, Utc::now());
        repo.seed([seeded]).await;
        assert_eq!(repo.create(create("next", &[])).await.unwrap().id, 11);
    }

    #[tokio::test]
    async fn test_update_missing_task_is_not_found() {
        let repo = InMemoryTaskRepository::new();
        let result = repo.update(42, UpdateTask::default()).await;
        assert!(matches!(result, Err(TaskError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_update_to_completed_sets_completed_date() {
        let repo = InMemoryTaskRepository::new();
        let task = repo.create(create("a", &[])).await.unwrap();
        let updated = repo
            .update(
                task.id,
                UpdateTask {
                    status: Some(STATUS_COMPLETED.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.completed_date.is_some());
    }

    #[tokio::test]
    async fn test_list_windows_sorted_results() {
        let repo = InMemoryTaskRepository::new();
        for title in ["c", "a", "b", "d"] {
            repo.create(create(title, &[])).await.unwrap();
        }
        let query = TaskQuery {
            predicates: vec![],
            sort: TaskSort {
                field: SortField::Title,
                order: SortOrder::Asc,
            },
            offset: 1,
            limit: 2,
        };
        let titles: Vec<String> = repo
            .list(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_tag_counts_fan_out() {
        let repo = InMemoryTaskRepository::new();
        repo.create(create("one", &["a"])).await.unwrap();
        repo.create(create("two", &["a", "b"])).await.unwrap();

        let counts = repo.tag_counts().await.unwrap();
        assert_eq!(counts, vec![("a".to_string(), 2), ("b".to_string(), 1)]);
    }
}

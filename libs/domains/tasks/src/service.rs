use chrono::Utc;
use observability::tasks::TaskMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;
use validator::Validate;

use crate::error::{TaskError, TaskResult};
use crate::facets::FilterOptions;
use crate::filter::{TaskFilterParams, TaskFilterQuery};
use crate::models::{CreateTask, PaginatedTasks, Task, TaskResponse, UpdateTask};
use crate::query::compose;
use crate::repository::TaskRepository;

/// Service layer for Task business logic
#[derive(Clone)]
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Filtered, sorted, paginated listing.
    ///
    /// Parameters are validated before the store is touched. The count and
    /// the page fetch share one predicate set; either failing fails the call.
    #[instrument(skip(self, query), fields(page = query.page, page_size = query.page_size))]
    pub async fn list_tasks(&self, query: TaskFilterQuery) -> TaskResult<PaginatedTasks> {
        let started = Instant::now();

        let params = TaskFilterParams::try_from(query).map_err(|errors| {
            for field in errors.field_errors().keys() {
                TaskMetrics::record_filter_rejection(field);
            }
            TaskError::InvalidFilter(errors)
        })?;

        let now = Utc::now();
        let task_query = compose(&params, now);

        let total = self.repository.count(&task_query.predicates).await?;
        // A window starting past the last match cannot return rows
        let tasks = if task_query.offset >= total {
            Vec::new()
        } else {
            self.repository.list(&task_query).await?
        };

        let page = PaginatedTasks::new(
            tasks
                .into_iter()
                .map(|task| TaskResponse::from_task(task, now))
                .collect(),
            total,
            params.page,
            params.page_size,
        );

        TaskMetrics::record_list(page.tasks.len(), total, started.elapsed());
        Ok(page)
    }

    /// Distinct status, priority and tag values over the whole store.
    #[instrument(skip(self))]
    pub async fn filter_options(&self) -> TaskResult<FilterOptions> {
        let statuses = self.repository.status_counts().await?;
        let priorities = self.repository.priority_counts().await?;
        let tags = self.repository.tag_counts().await?;

        Ok(FilterOptions::from_counts(statuses, priorities, tags))
    }

    /// Create a new task with validation
    #[instrument(skip(self, input), fields(task_title = %input.title))]
    pub async fn create_task(&self, input: CreateTask) -> TaskResult<Task> {
        input.validate()?;

        let task = self.repository.create(input).await?;
        TaskMetrics::record_created();
        Ok(task)
    }

    #[instrument(skip(self), fields(task_id = id))]
    pub async fn get_task(&self, id: i64) -> TaskResult<Task> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    /// Update a task
    #[instrument(skip(self, input), fields(task_id = id))]
    pub async fn update_task(&self, id: i64, input: UpdateTask) -> TaskResult<Task> {
        input.validate()?;

        let task = self.repository.update(id, input).await?;
        TaskMetrics::record_updated();
        Ok(task)
    }

    /// Delete a task; a missing id is `NotFound`
    #[instrument(skip(self), fields(task_id = id))]
    pub async fn delete_task(&self, id: i64) -> TaskResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(TaskError::NotFound(id));
        }

        TaskMetrics::record_deleted();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskPriority;
    use crate::repository::MockTaskRepository;
    use chrono::NaiveDate;

    fn query() -> TaskFilterQuery {
        TaskFilterQuery {
            sort_by: "createdDate".to_string(),
            sort_order: "desc".to_string(),
            page: 1,
            page_size: 20,
            ..Default::default()
        }
    }

    fn sample(id: i64) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: None,
            status: "pending".to_string(),
            priority: TaskPriority::Medium,
            tags: vec![],
            created_date: Utc::now(),
            due_date: None,
            completed_date: None,
        }
    }

    #[tokio::test]
    async fn test_invalid_date_range_never_reaches_store() {
        let mut repo = MockTaskRepository::new();
        repo.expect_count().never();
        repo.expect_list().never();
        let service = TaskService::new(repo);

        let mut q = query();
        q.due_date_from = NaiveDate::from_ymd_opt(2025, 6, 10);
        q.due_date_to = NaiveDate::from_ymd_opt(2025, 6, 1);

        let result = service.list_tasks(q).await;
        assert!(matches!(result, Err(TaskError::InvalidFilter(_))));
    }

    #[tokio::test]
    async fn test_count_failure_aborts_before_page_fetch() {
        let mut repo = MockTaskRepository::new();
        repo.expect_count()
            .times(1)
            .returning(|_| Err(TaskError::Database("count failed".to_string())));
        repo.expect_list().never();
        let service = TaskService::new(repo);

        let result = service.list_tasks(query()).await;
        assert!(matches!(result, Err(TaskError::Database(_))));
    }

    #[tokio::test]
    async fn test_page_fetch_failure_fails_whole_request() {
        let mut repo = MockTaskRepository::new();
        repo.expect_count().returning(|_| Ok(3));
        repo.expect_list()
            .returning(|_| Err(TaskError::Database("fetch failed".to_string())));
        let service = TaskService::new(repo);

        let result = service.list_tasks(query()).await;
        assert!(matches!(result, Err(TaskError::Database(msg)) if msg == "fetch failed"));
    }

    #[tokio::test]
    async fn test_envelope_reports_matching_count() {
        let mut repo = MockTaskRepository::new();
        repo.expect_count().returning(|_| Ok(45));
        repo.expect_list()
            .withf(|q| q.offset == 40 && q.limit == 20)
            .returning(|_| Ok((41..=45).map(sample).collect()));
        let service = TaskService::new(repo);

        let mut q = query();
        q.page = 3;
        let page = service.list_tasks(q).await.unwrap();

        assert_eq!(page.tasks.len(), 5);
        assert_eq!(page.total_count, 45);
        assert_eq!(page.filtered_count, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);
        assert_eq!(page.page_size, 20);
    }

    #[tokio::test]
    async fn test_page_past_last_match_skips_page_fetch() {
        let mut repo = MockTaskRepository::new();
        repo.expect_count().returning(|_| Ok(3));
        repo.expect_list().never();
        let service = TaskService::new(repo);

        let mut q = query();
        q.page = 92_233_720_368_547_758;
        q.page_size = 100;
        let page = service.list_tasks(q).await.unwrap();

        assert!(page.tasks.is_empty());
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 92_233_720_368_547_758);
    }

    #[tokio::test]
    async fn test_empty_store_skips_page_fetch() {
        let mut repo = MockTaskRepository::new();
        repo.expect_count().returning(|_| Ok(0));
        repo.expect_list().never();
        let service = TaskService::new(repo);

        let page = service.list_tasks(query()).await.unwrap();
        assert!(page.tasks.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_filter_options_failure_propagates() {
        let mut repo = MockTaskRepository::new();
        repo.expect_status_counts()
            .returning(|| Err(TaskError::Database("boom".to_string())));
        repo.expect_priority_counts().never();
        let service = TaskService::new(repo);

        assert!(service.filter_options().await.is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_task_is_not_found() {
        let mut repo = MockTaskRepository::new();
        repo.expect_delete().returning(|_| Ok(false));
        let service = TaskService::new(repo);

        assert!(matches!(
            service.delete_task(5).await,
            Err(TaskError::NotFound(5))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_without_store_call() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create().never();
        let service = TaskService::new(repo);

        let input = CreateTask {
            title: String::new(),
            description: None,
            status: "pending".to_string(),
            priority: TaskPriority::Low,
            tags: vec![],
            due_date: None,
        };
        assert!(matches!(
            service.create_task(input).await,
            Err(TaskError::Validation(_))
        ));
    }
}

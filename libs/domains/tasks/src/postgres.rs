use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, NullOrdering, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Statement,
};

use crate::{
    entity,
    error::{TaskError, TaskResult},
    filter::{SortField, SortOrder},
    models::{CreateTask, STATUS_COMPLETED, Task, TaskPriority, UpdateTask},
    query::{Predicate, TaskQuery},
    repository::TaskRepository,
};

const STATUS_COUNTS_SQL: &str =
    r#"SELECT "status" AS value, COUNT(*) AS count FROM "tasks" GROUP BY "status""#;
const PRIORITY_COUNTS_SQL: &str =
    r#"SELECT "priority"::text AS value, COUNT(*) AS count FROM "tasks" GROUP BY "priority""#;
const TAG_COUNTS_SQL: &str = r#"SELECT tag AS value, COUNT(*) AS count FROM "tasks", unnest("tags") AS tag GROUP BY tag"#;

#[derive(Debug, FromQueryResult)]
struct ValueCount {
    value: String,
    count: i64,
}

pub struct PgTaskRepository {
    db: DatabaseConnection,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn value_counts(&self, sql: &str) -> TaskResult<Vec<(String, u64)>> {
        let rows = ValueCount::find_by_statement(Statement::from_string(DbBackend::Postgres, sql))
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.value, row.count.max(0) as u64))
            .collect())
    }
}

/// `%term%` with LIKE metacharacters escaped so they match literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn predicate_condition(predicate: &Predicate) -> Condition {
    use entity::Column;

    match predicate {
        Predicate::Search(term) => {
            let pattern = like_pattern(term);
            Condition::any()
                .add(Expr::cust_with_values(
                    r#"LOWER("title") LIKE $1"#,
                    [pattern.clone()],
                ))
                .add(Expr::cust_with_values(
                    r#"LOWER("description") LIKE $1"#,
                    [pattern],
                ))
        }
        Predicate::StatusIn(statuses) => {
            Condition::all().add(Column::Status.is_in(statuses.iter().cloned()))
        }
        Predicate::PriorityIn(priorities) => {
            Condition::all().add(Column::Priority.is_in(priorities.iter().copied()))
        }
        Predicate::TagsOverlap(tags) => {
            Condition::all().add(Expr::cust_with_values(r#""tags" && $1"#, [tags.clone()]))
        }
        Predicate::DueFrom(bound) => Condition::all().add(Column::DueDate.gte(*bound)),
        Predicate::DueBefore(bound) => Condition::all().add(Column::DueDate.lt(*bound)),
        Predicate::CreatedFrom(bound) => Condition::all().add(Column::CreatedDate.gte(*bound)),
        Predicate::CreatedBefore(bound) => Condition::all().add(Column::CreatedDate.lt(*bound)),
        Predicate::Overdue { now } => Condition::all()
            .add(Column::DueDate.lt(*now))
            .add(Column::Status.ne(STATUS_COMPLETED)),
        Predicate::Completed => Condition::all().add(Column::Status.eq(STATUS_COMPLETED)),
    }
}

/// Conjunction of every predicate; empty means no constraint.
pub fn condition(predicates: &[Predicate]) -> Condition {
    predicates
        .iter()
        .fold(Condition::all(), |cond, p| cond.add(predicate_condition(p)))
}

/// `SELECT` over tasks narrowed by `predicates`. No predicates leaves the
/// statement without a `WHERE` clause.
pub fn filtered(predicates: &[Predicate]) -> Select<entity::Entity> {
    let select = entity::Entity::find();
    if predicates.is_empty() {
        select
    } else {
        select.filter(condition(predicates))
    }
}

fn sort_column(field: SortField) -> entity::Column {
    match field {
        SortField::CreatedDate => entity::Column::CreatedDate,
        SortField::DueDate => entity::Column::DueDate,
        SortField::Priority => entity::Column::Priority,
        SortField::Title => entity::Column::Title,
        SortField::Status => entity::Column::Status,
    }
}

fn sort_order(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

/// Select for one listing page: filtered, ordered with nulls last and an
/// id tiebreak, then windowed.
pub fn list_select(query: &TaskQuery) -> Select<entity::Entity> {
    let order = sort_order(query.sort.order);
    filtered(&query.predicates)
        .order_by_with_nulls(sort_column(query.sort.field), order.clone(), NullOrdering::Last)
        .order_by(entity::Column::Id, order)
        .offset(query.offset)
        .limit(query.limit)
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, input: CreateTask) -> TaskResult<Task> {
        let active_model: entity::ActiveModel = input.into_task(0, Utc::now()).into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(task_id = model.id, "Created task");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> TaskResult<Option<Task>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn update(&self, id: i64, input: UpdateTask) -> TaskResult<Task> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        let mut task: Task = model.into();
        task.apply_update(input, Utc::now());

        let active_model: entity::ActiveModel = task.into();
        let updated = active_model.update(&self.db).await?;

        tracing::info!(task_id = id, "Updated task");
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> TaskResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(task_id = id, "Deleted task");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count(&self, predicates: &[Predicate]) -> TaskResult<u64> {
        let count = filtered(predicates).count(&self.db).await?;
        Ok(count)
    }

    async fn list(&self, query: &TaskQuery) -> TaskResult<Vec<Task>> {
        let models = list_select(query).all(&self.db).await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn status_counts(&self) -> TaskResult<Vec<(String, u64)>> {
        self.value_counts(STATUS_COUNTS_SQL).await
    }

    async fn priority_counts(&self) -> TaskResult<Vec<(TaskPriority, u64)>> {
        let counts = self.value_counts(PRIORITY_COUNTS_SQL).await?;
        Ok(counts
            .into_iter()
            .filter_map(|(value, count)| match value.parse::<TaskPriority>() {
                Ok(priority) => Some((priority, count)),
                Err(_) => {
                    tracing::warn!(value = %value, "Skipping unknown priority in facet counts");
                    None
                }
            })
            .collect())
    }

    async fn tag_counts(&self) -> TaskResult<Vec<(String, u64)>> {
        self.value_counts(TAG_COUNTS_SQL).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TaskFilterParams;
    use crate::query::compose;
    use chrono::TimeZone;
    use sea_orm::{DbErr, MockDatabase, QueryTrait};

    fn sql(predicates: &[Predicate]) -> String {
        filtered(predicates)
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("alpha"), "%alpha%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_no_predicates_means_no_where_clause() {
        assert!(!sql(&[]).contains("WHERE"));

        let page = list_select(&compose(&TaskFilterParams::default(), Utc::now()))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(!page.contains("WHERE"), "{page}");
        assert!(page.contains("LIMIT 20"), "{page}");
    }

    #[test]
    fn test_search_ors_title_and_description() {
        let sql = sql(&[Predicate::Search("alpha".to_string())]);
        assert!(sql.contains(r#"LOWER("title") LIKE"#), "{sql}");
        assert!(sql.contains(r#"LOWER("description") LIKE"#), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
    }

    #[test]
    fn test_filters_are_anded() {
        let sql = sql(&[
            Predicate::StatusIn(vec!["pending".to_string(), "in_progress".to_string()]),
            Predicate::TagsOverlap(vec!["ops".to_string()]),
            Predicate::Completed,
        ]);
        assert!(sql.contains(r#""status" IN ('pending', 'in_progress')"#), "{sql}");
        assert!(sql.contains(r#""tags" &&"#), "{sql}");
        assert!(sql.contains(r#""status" = 'completed'"#), "{sql}");
        assert!(sql.matches(" AND ").count() >= 2, "{sql}");
    }

    #[test]
    fn test_overdue_condition() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let sql = sql(&[Predicate::Overdue { now }]);
        assert!(sql.contains(r#""due_date" <"#), "{sql}");
        assert!(sql.contains(r#""status" <> 'completed'"#), "{sql}");
    }

    #[test]
    fn test_list_select_orders_nulls_last_with_id_tiebreak() {
        let params = TaskFilterParams {
            sort_by: SortField::DueDate,
            sort_order: SortOrder::Asc,
            page: 2,
            page_size: 10,
            ..Default::default()
        };
        let sql = list_select(&compose(&params, Utc::now()))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""due_date" ASC NULLS LAST"#), "{sql}");
        assert!(sql.contains(r#""id" ASC"#), "{sql}");
        assert!(sql.contains("LIMIT 10"), "{sql}");
        assert!(sql.contains("OFFSET 10"), "{sql}");
    }

    #[tokio::test]
    async fn test_store_failure_propagates_as_database_error() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let result = repo.count(&[Predicate::Completed]).await;
        assert!(matches!(result, Err(TaskError::Database(msg)) if msg.contains("connection reset")));
    }

    #[tokio::test]
    async fn test_get_by_id_maps_model() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![entity::Model {
                id: 7,
                title: "Alpha Release".to_string(),
                description: None,
                status: "pending".to_string(),
                priority: TaskPriority::High,
                tags: vec!["ops".to_string()],
                created_date: created.into(),
                due_date: None,
                completed_date: None,
            }]])
            .into_connection();
        let repo = PgTaskRepository::new(db);

        let task = repo.get_by_id(7).await.unwrap().unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.created_date, created);
    }
}

use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::Display;
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELLED: &str = "cancelled";

/// Task priority levels, ordered from least to most pressing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
    TS,
)]
#[ts(export)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_priority")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    #[sea_orm(string_value = "low")]
    Low,
    /// Default priority
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "urgent")]
    Urgent,
}

/// A priority name outside low, medium, high and urgent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown priority '{0}'")]
pub struct UnknownPriority(pub String);

/// Parses the lowercase wire names; case-sensitive like the database enum.
impl FromStr for TaskPriority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(UnknownPriority(other.to_string())),
        }
    }
}

/// A schedulable work item.
///
/// `status` is an open set of strings; only `completed` carries meaning
/// (it drives `completed_date` and overdue computation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: TaskPriority,
    pub tags: Vec<String>,
    #[ts(as = "String")]
    pub created_date: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,
    /// Set once, the first time the task reaches `completed`
    #[ts(as = "Option<String>")]
    pub completed_date: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }

    /// Due date has passed and the task is not completed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        matches!(self.due_date, Some(due) if due < now) && !self.is_completed()
    }

    /// Whole calendar days from `now`'s date to the due date. Negative once past due.
    pub fn days_until_due(&self, now: DateTime<Utc>) -> Option<i64> {
        self.due_date
            .map(|due| (due.date_naive() - now.date_naive()).num_days())
    }

    /// Apply the fields present in `update`.
    ///
    /// Moving into `completed` stamps `completed_date` if it is unset. The
    /// stamp is never cleared, even if the status later changes again.
    pub fn apply_update(&mut self, update: UpdateTask, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = Some(due_date);
        }
        if self.is_completed() && self.completed_date.is_none() {
            self.completed_date = Some(now);
        }
    }
}

fn default_status() -> String {
    STATUS_PENDING.to_string()
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    if status.trim().is_empty() || status.len() > 50 {
        return Err(ValidationError::new("invalid_status")
            .with_message("status must be 1-50 non-blank characters".into()));
    }
    Ok(())
}

/// DTO for creating a new task
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_status")]
    #[validate(custom(function = "validate_status"))]
    pub status: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTask {
    /// Build the task a store will persist, before it has an id.
    pub fn into_task(self, id: i64, now: DateTime<Utc>) -> Task {
        let completed_date = (self.status == STATUS_COMPLETED).then_some(now);
        Task {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            tags: self.tags,
            created_date: now,
            due_date: self.due_date,
            completed_date,
        }
    }
}

/// DTO for updating an existing task; absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, Default, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    pub priority: Option<TaskPriority>,
    pub tags: Option<Vec<String>>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Task as returned over HTTP, with derived due-date fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: TaskPriority,
    pub tags: Vec<String>,
    #[ts(as = "String")]
    pub created_date: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub completed_date: Option<DateTime<Utc>>,
    pub is_overdue: bool,
    pub days_until_due: Option<i64>,
}

impl TaskResponse {
    pub fn from_task(task: Task, now: DateTime<Utc>) -> Self {
        let is_overdue = task.is_overdue(now);
        let days_until_due = task.days_until_due(now);
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            tags: task.tags,
            created_date: task.created_date,
            due_date: task.due_date,
            completed_date: task.completed_date,
            is_overdue,
            days_until_due,
        }
    }
}

/// Pagination envelope for the filtered listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedTasks {
    pub tasks: Vec<TaskResponse>,
    /// Tasks matching the filters
    pub total_count: u64,
    /// Same value as `total_count`
    pub filtered_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl PaginatedTasks {
    pub fn new(tasks: Vec<TaskResponse>, total_count: u64, page: u64, page_size: u64) -> Self {
        Self {
            tasks,
            total_count,
            filtered_count: total_count,
            page,
            page_size,
            total_pages: total_pages(total_count, page_size),
        }
    }
}

/// `ceil(total / page_size)`; zero when nothing matched.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parses_wire_names_only() {
        assert_eq!("urgent".parse::<TaskPriority>(), Ok(TaskPriority::Urgent));
        assert_eq!("low".parse::<TaskPriority>(), Ok(TaskPriority::Low));
        assert_eq!(
            "High".parse::<TaskPriority>(),
            Err(UnknownPriority("High".to_string()))
        );
        assert!("critical".parse::<TaskPriority>().is_err());
        assert_eq!(TaskPriority::Medium.to_string(), "medium");
    }
    use chrono::Duration;

    fn task(status: &str, due_in: Option<Duration>, now: DateTime<Utc>) -> Task {
        Task {
            id: 1,
            title: "Write report".to_string(),
            description: None,
            status: status.to_string(),
            priority: TaskPriority::Medium,
            tags: vec![],
            created_date: now,
            due_date: due_in.map(|d| now + d),
            completed_date: None,
        }
    }

    #[test]
    fn test_priority_order_and_strings() {
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert!(TaskPriority::High < TaskPriority::Urgent);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!("urgent".parse::<TaskPriority>().unwrap(), TaskPriority::Urgent);
        assert!("critical".parse::<TaskPriority>().is_err());
        assert_eq!(TaskPriority::High.to_string(), "high");
    }

    #[test]
    fn test_overdue_requires_past_due_and_not_completed() {
        let now = Utc::now();
        assert!(task(STATUS_PENDING, Some(Duration::days(-1)), now).is_overdue(now));
        assert!(!task(STATUS_COMPLETED, Some(Duration::days(-1)), now).is_overdue(now));
        assert!(!task(STATUS_PENDING, Some(Duration::days(1)), now).is_overdue(now));
        assert!(!task(STATUS_PENDING, None, now).is_overdue(now));
    }

    #[test]
    fn test_days_until_due_counts_calendar_days() {
        let now = Utc::now();
        assert_eq!(task(STATUS_PENDING, Some(Duration::days(3)), now).days_until_due(now), Some(3));
        assert_eq!(task(STATUS_PENDING, Some(Duration::days(-2)), now).days_until_due(now), Some(-2));
        assert_eq!(task(STATUS_PENDING, None, now).days_until_due(now), None);
    }

    #[test]
    fn test_completed_date_is_set_once_and_never_cleared() {
        let now = Utc::now();
        let mut t = task(STATUS_PENDING, None, now);

        t.apply_update(
            UpdateTask {
                status: Some(STATUS_COMPLETED.to_string()),
                ..Default::default()
            },
            now,
        );
        assert_eq!(t.completed_date, Some(now));

        let later = now + Duration::hours(1);
        t.apply_update(
            UpdateTask {
                status: Some(STATUS_IN_PROGRESS.to_string()),
                ..Default::default()
            },
            later,
        );
        t.apply_update(
            UpdateTask {
                status: Some(STATUS_COMPLETED.to_string()),
                ..Default::default()
            },
            later,
        );
        assert_eq!(t.completed_date, Some(now));
    }

    #[test]
    fn test_create_completed_task_stamps_completed_date() {
        let now = Utc::now();
        let input = CreateTask {
            title: "Done already".to_string(),
            description: None,
            status: STATUS_COMPLETED.to_string(),
            priority: TaskPriority::Low,
            tags: vec![],
            due_date: None,
        };
        assert_eq!(input.into_task(1, now).completed_date, Some(now));
    }

    #[test]
    fn test_create_task_validation() {
        let input: CreateTask = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(input.validate().is_err());

        let input: CreateTask = serde_json::from_str(r#"{"title": "Plan sprint"}"#).unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.status, STATUS_PENDING);
        assert_eq!(input.priority, TaskPriority::Medium);
        assert!(input.tags.is_empty());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(3, 1), 3);
    }

    #[test]
    fn test_response_is_camel_case() {
        let now = Utc::now();
        let response = TaskResponse::from_task(task(STATUS_PENDING, Some(Duration::days(-1)), now), now);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["isOverdue"], true);
        assert_eq!(json["daysUntilDue"], -1);
        assert!(json.get("createdDate").is_some());
        assert!(json["completedDate"].is_null());
    }
}

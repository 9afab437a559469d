//! Filter parameters for the task listing.
//!
//! [`TaskFilterQuery`] is the raw query string; [`TaskFilterParams`] is the
//! typed value produced once every rule has passed. All violations are
//! reported together as [`ValidationErrors`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::TaskPriority;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

const SORT_FIELDS: [&str; 5] = ["createdDate", "dueDate", "priority", "title", "status"];
const PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

/// Column a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize, ToSchema)]
pub enum SortField {
    #[default]
    #[strum(serialize = "createdDate")]
    #[serde(rename = "createdDate")]
    CreatedDate,
    #[strum(serialize = "dueDate")]
    #[serde(rename = "dueDate")]
    DueDate,
    #[strum(serialize = "priority")]
    #[serde(rename = "priority")]
    Priority,
    #[strum(serialize = "title")]
    #[serde(rename = "title")]
    Title,
    #[strum(serialize = "status")]
    #[serde(rename = "status")]
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

fn default_sort_by() -> String {
    SortField::default().to_string()
}

fn default_sort_order() -> String {
    SortOrder::default().to_string()
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn entries_error(code: &'static str, message: String, entries: &[String]) -> ValidationError {
    let mut error = ValidationError::new(code).with_message(Cow::Owned(message));
    error.add_param(Cow::from("value"), &entries);
    error
}

fn validate_entries(entries: &Vec<String>) -> Result<(), ValidationError> {
    if entries.iter().any(|entry| entry.trim().is_empty()) {
        return Err(entries_error(
            "blank_entry",
            "entries must not be blank".to_string(),
            entries,
        ));
    }
    Ok(())
}

fn validate_priorities(entries: &Vec<String>) -> Result<(), ValidationError> {
    validate_entries(entries)?;
    if let Some(bad) = entries
        .iter()
        .find(|entry| !PRIORITIES.contains(&entry.as_str()))
    {
        let mut error = entries_error(
            "invalid_enum",
            format!("'{}' is not one of: {}", bad, PRIORITIES.join(", ")),
            entries,
        );
        error.add_param(Cow::from("allowed"), &PRIORITIES);
        return Err(error);
    }
    Ok(())
}

fn validate_sort_field(value: &str) -> Result<(), ValidationError> {
    if SORT_FIELDS.contains(&value) {
        return Ok(());
    }
    let mut error = ValidationError::new("invalid_sort_field").with_message(Cow::Owned(format!(
        "sort_by must be one of: {}",
        SORT_FIELDS.join(", ")
    )));
    error.add_param(Cow::from("value"), &value);
    Err(error)
}

fn validate_sort_order(value: &str) -> Result<(), ValidationError> {
    if value.parse::<SortOrder>().is_ok() {
        return Ok(());
    }
    let mut error = ValidationError::new("invalid_sort_order")
        .with_message(Cow::Borrowed("sort_order must be 'asc' or 'desc'"));
    error.add_param(Cow::from("value"), &value);
    Err(error)
}

/// Raw listing parameters as they arrive in the query string.
///
/// `status`, `priority` and `tags` are repeated keys
/// (`?status=pending&status=in_progress`).
#[derive(Debug, Clone, Deserialize, Validate, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct TaskFilterQuery {
    /// Case-insensitive substring of title or description
    #[validate(length(max = 200))]
    pub search: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_entries"))]
    pub status: Vec<String>,
    /// One or more of low, medium, high, urgent
    #[serde(default)]
    #[validate(custom(function = "validate_priorities"))]
    pub priority: Vec<String>,
    /// Matches tasks sharing at least one tag
    #[serde(default)]
    #[validate(custom(function = "validate_entries"))]
    pub tags: Vec<String>,
    pub due_date_from: Option<NaiveDate>,
    pub due_date_to: Option<NaiveDate>,
    pub created_date_from: Option<NaiveDate>,
    pub created_date_to: Option<NaiveDate>,
    #[serde(default)]
    pub overdue_only: bool,
    #[serde(default)]
    pub completed_only: bool,
    /// createdDate, dueDate, priority, title or status
    #[serde(default = "default_sort_by")]
    #[param(default = "createdDate")]
    #[validate(custom(function = "validate_sort_field"))]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    #[param(default = "desc")]
    #[validate(custom(function = "validate_sort_order"))]
    pub sort_order: String,
    #[serde(default = "default_page")]
    #[param(default = 1, minimum = 1)]
    #[validate(range(min = 1))]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(default = 20, minimum = 1, maximum = 100)]
    #[validate(range(min = 1, max = 100))]
    pub page_size: i64,
}

impl TaskFilterQuery {
    /// Field rules plus the date-range cross checks, collected together.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        check_range(
            &mut errors,
            "due_date_to",
            self.due_date_from,
            self.due_date_to,
        );
        check_range(
            &mut errors,
            "created_date_to",
            self.created_date_from,
            self.created_date_to,
        );
        check_page_window(&mut errors, self.page, self.page_size);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_range(
    errors: &mut ValidationErrors,
    field: &'static str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) {
    if let (Some(from), Some(to)) = (from, to) {
        if to < from {
            let mut error = ValidationError::new("invalid_date_range").with_message(
                Cow::Owned(format!("{} ({}) is before the range start ({})", field, to, from)),
            );
            error.add_param(Cow::from("from"), &from.to_string());
            error.add_param(Cow::from("to"), &to.to_string());
            errors.add(field, error);
        }
    }
}

/// The row offset of `page` must fit a signed 64-bit bind parameter.
/// Pages outside the field ranges are already reported there.
fn check_page_window(errors: &mut ValidationErrors, page: i64, page_size: i64) {
    if page < 1 || !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return;
    }
    if (page - 1).checked_mul(page_size).is_none() {
        let mut error = ValidationError::new("page_out_of_range").with_message(Cow::Owned(
            format!("page {} is beyond the last addressable row", page),
        ));
        error.add_param(Cow::from("value"), &page);
        errors.add("page", error);
    }
}

/// Validated, typed listing parameters. Built per request and consumed once.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFilterParams {
    pub search: Option<String>,
    pub statuses: Vec<String>,
    pub priorities: Vec<TaskPriority>,
    pub tags: Vec<String>,
    pub due_date_from: Option<NaiveDate>,
    pub due_date_to: Option<NaiveDate>,
    pub created_date_from: Option<NaiveDate>,
    pub created_date_to: Option<NaiveDate>,
    pub overdue_only: bool,
    pub completed_only: bool,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub page: u64,
    pub page_size: u64,
}

impl Default for TaskFilterParams {
    fn default() -> Self {
        Self {
            search: None,
            statuses: Vec::new(),
            priorities: Vec::new(),
            tags: Vec::new(),
            due_date_from: None,
            due_date_to: None,
            created_date_from: None,
            created_date_to: None,
            overdue_only: false,
            completed_only: false,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE as u64,
        }
    }
}

impl TryFrom<TaskFilterQuery> for TaskFilterParams {
    type Error = ValidationErrors;

    fn try_from(query: TaskFilterQuery) -> Result<Self, Self::Error> {
        query.check()?;
        Ok(Self::from_checked(query))
    }
}

impl TaskFilterParams {
    /// Typed conversion of an already checked query.
    ///
    /// Sort names that do not parse fall back to `createdDate desc`.
    fn from_checked(query: TaskFilterQuery) -> Self {
        let (sort_by, sort_order) = match (
            query.sort_by.parse::<SortField>(),
            query.sort_order.parse::<SortOrder>(),
        ) {
            (Ok(field), Ok(order)) => (field, order),
            (Ok(field), Err(_)) => (field, SortOrder::Desc),
            (Err(_), _) => (SortField::CreatedDate, SortOrder::Desc),
        };

        Self {
            search: query.search.filter(|term| !term.is_empty()),
            statuses: query.status,
            priorities: query
                .priority
                .iter()
                .filter_map(|p| p.parse::<TaskPriority>().ok())
                .collect(),
            tags: query.tags,
            due_date_from: query.due_date_from,
            due_date_to: query.due_date_to,
            created_date_from: query.created_date_from,
            created_date_to: query.created_date_to,
            overdue_only: query.overdue_only,
            completed_only: query.completed_only,
            sort_by,
            sort_order,
            page: query.page.max(1) as u64,
            page_size: query.page_size.clamp(1, MAX_PAGE_SIZE) as u64,
        }
    }
}

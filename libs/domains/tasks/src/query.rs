//! Predicate composition for the task listing.
//!
//! [`compose`] turns validated parameters into a conjunction of
//! [`Predicate`]s, a single-key [`TaskSort`] and an offset/limit window.
//! Stores translate the same value into SQL or evaluate it in memory.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use std::cmp::Ordering;

use crate::filter::{SortField, SortOrder, TaskFilterParams};
use crate::models::{STATUS_COMPLETED, Task, TaskPriority};

/// One condition over task fields. A query matches when all of its
/// predicates do.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Lowercased term found in the title or the description
    Search(String),
    StatusIn(Vec<String>),
    PriorityIn(Vec<TaskPriority>),
    /// At least one tag in common
    TagsOverlap(Vec<String>),
    /// `due_date >= bound`
    DueFrom(DateTime<Utc>),
    /// `due_date < bound`
    DueBefore(DateTime<Utc>),
    CreatedFrom(DateTime<Utc>),
    CreatedBefore(DateTime<Utc>),
    /// Past due and not completed
    Overdue { now: DateTime<Utc> },
    Completed,
}

impl Predicate {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Predicate::Search(term) => {
                task.title.to_lowercase().contains(term)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(term))
            }
            Predicate::StatusIn(statuses) => statuses.contains(&task.status),
            Predicate::PriorityIn(priorities) => priorities.contains(&task.priority),
            Predicate::TagsOverlap(tags) => task.tags.iter().any(|tag| tags.contains(tag)),
            Predicate::DueFrom(bound) => task.due_date.is_some_and(|due| due >= *bound),
            Predicate::DueBefore(bound) => task.due_date.is_some_and(|due| due < *bound),
            Predicate::CreatedFrom(bound) => task.created_date >= *bound,
            Predicate::CreatedBefore(bound) => task.created_date < *bound,
            Predicate::Overdue { now } => task.is_overdue(*now),
            Predicate::Completed => task.status == STATUS_COMPLETED,
        }
    }
}

/// Returns true when `task` satisfies every predicate.
pub fn matches_all(predicates: &[Predicate], task: &Task) -> bool {
    predicates.iter().all(|p| p.matches(task))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl TaskSort {
    /// Orders by the sort key, tasks lacking the key last in either
    /// direction, then by id in the same direction.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let by_key = match self.field {
            SortField::CreatedDate => self.directed(a.created_date.cmp(&b.created_date)),
            SortField::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => self.directed(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortField::Priority => self.directed(a.priority.cmp(&b.priority)),
            SortField::Title => self.directed(a.title.cmp(&b.title)),
            SortField::Status => self.directed(a.status.cmp(&b.status)),
        };
        by_key.then_with(|| self.directed(a.id.cmp(&b.id)))
    }

    fn directed(&self, ordering: Ordering) -> Ordering {
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Everything a store needs to serve one listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub predicates: Vec<Predicate>,
    pub sort: TaskSort,
    pub offset: u64,
    pub limit: u64,
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Start of the day after `date`, the exclusive upper bound of an
/// inclusive day range. `None` at the end of the calendar.
fn start_of_next_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.checked_add_days(Days::new(1)).map(start_of_day)
}

/// Build the predicate set, sort and window for `params`.
///
/// Absent filters add nothing. Date bounds are whole UTC days, inclusive
/// at both ends. `now` anchors the overdue predicate.
pub fn compose(params: &TaskFilterParams, now: DateTime<Utc>) -> TaskQuery {
    let mut predicates = Vec::new();

    if let Some(term) = &params.search {
        predicates.push(Predicate::Search(term.to_lowercase()));
    }
    if !params.statuses.is_empty() {
        predicates.push(Predicate::StatusIn(params.statuses.clone()));
    }
    if !params.priorities.is_empty() {
        predicates.push(Predicate::PriorityIn(params.priorities.clone()));
    }
    if !params.tags.is_empty() {
        predicates.push(Predicate::TagsOverlap(params.tags.clone()));
    }
    if let Some(from) = params.due_date_from {
        predicates.push(Predicate::DueFrom(start_of_day(from)));
    }
    if let Some(bound) = params.due_date_to.and_then(start_of_next_day) {
        predicates.push(Predicate::DueBefore(bound));
    }
    if let Some(from) = params.created_date_from {
        predicates.push(Predicate::CreatedFrom(start_of_day(from)));
    }
    if let Some(bound) = params.created_date_to.and_then(start_of_next_day) {
        predicates.push(Predicate::CreatedBefore(bound));
    }
    if params.overdue_only {
        predicates.push(Predicate::Overdue { now });
    }
    if params.completed_only {
        predicates.push(Predicate::Completed);
    }

    TaskQuery {
        predicates,
        sort: TaskSort {
            field: params.sort_by,
            order: params.sort_order,
        },
        offset: params.page.saturating_sub(1).saturating_mul(params.page_size),
        limit: params.page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn task(id: i64) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: None,
            status: "pending".to_string(),
            priority: TaskPriority::Medium,
            tags: vec![],
            created_date: at(2025, 1, 1, 9),
            due_date: None,
            completed_date: None,
        }
    }

    #[test]
    fn test_empty_params_compose_no_predicates() {
        let query = compose(&TaskFilterParams::default(), Utc::now());
        assert!(query.predicates.is_empty());
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, 20);
        assert_eq!(query.sort, TaskSort::default());
    }

    #[test]
    fn test_offset_from_page() {
        let params = TaskFilterParams {
            page: 3,
            page_size: 25,
            ..Default::default()
        };
        let query = compose(&params, Utc::now());
        assert_eq!(query.offset, 50);
        assert_eq!(query.limit, 25);
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_or_description() {
        let params = TaskFilterParams {
            search: Some("ALPHA".to_string()),
            ..Default::default()
        };
        let query = compose(&params, Utc::now());
        assert_eq!(query.predicates, vec![Predicate::Search("alpha".to_string())]);

        let mut titled = task(1);
        titled.title = "Alpha Release".to_string();
        let mut described = task(2);
        described.description = Some("ship the alpha build".to_string());

        assert!(matches_all(&query.predicates, &titled));
        assert!(matches_all(&query.predicates, &described));
        assert!(!matches_all(&query.predicates, &task(3)));
    }

    #[test]
    fn test_tags_overlap_needs_one_common_tag() {
        let predicate = Predicate::TagsOverlap(vec!["ops".to_string(), "docs".to_string()]);
        let mut t = task(1);
        t.tags = vec!["docs".to_string(), "backend".to_string()];
        assert!(predicate.matches(&t));
        t.tags = vec!["backend".to_string()];
        assert!(!predicate.matches(&t));
    }

    #[test]
    fn test_due_range_is_inclusive_by_day() {
        let params = TaskFilterParams {
            due_date_from: Some("2025-06-01".parse().unwrap()),
            due_date_to: Some("2025-06-10".parse().unwrap()),
            ..Default::default()
        };
        let query = compose(&params, Utc::now());
        let due = |d: Option<DateTime<Utc>>| {
            let mut t = task(1);
            t.due_date = d;
            matches_all(&query.predicates, &t)
        };

        assert!(due(Some(at(2025, 6, 1, 0))));
        assert!(due(Some(at(2025, 6, 10, 23))));
        assert!(!due(Some(at(2025, 5, 31, 23))));
        assert!(!due(Some(at(2025, 6, 11, 0))));
        assert!(!due(None));
    }

    #[test]
    fn test_created_range_filters_on_creation_day() {
        let params = TaskFilterParams {
            created_date_from: Some("2025-01-01".parse().unwrap()),
            created_date_to: Some("2025-01-01".parse().unwrap()),
            ..Default::default()
        };
        let query = compose(&params, Utc::now());
        let mut t = task(1);
        assert!(matches_all(&query.predicates, &t));
        t.created_date = at(2025, 1, 2, 0);
        assert!(!matches_all(&query.predicates, &t));
    }

    #[test]
    fn test_overdue_and_completed_never_both_match() {
        let now = Utc::now();
        let params = TaskFilterParams {
            overdue_only: true,
            completed_only: true,
            ..Default::default()
        };
        let query = compose(&params, now);

        for status in ["pending", "completed", "in_progress"] {
            let mut t = task(1);
            t.status = status.to_string();
            t.due_date = Some(now - Duration::days(1));
            assert!(!matches_all(&query.predicates, &t));
        }
    }

    #[test]
    fn test_missing_due_dates_sort_last_both_ways() {
        let mut a = task(1);
        a.due_date = Some(at(2025, 3, 1, 0));
        let mut b = task(2);
        b.due_date = Some(at(2025, 4, 1, 0));
        let c = task(3);

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let sort = TaskSort {
                field: SortField::DueDate,
                order,
            };
            let mut tasks = vec![c.clone(), b.clone(), a.clone()];
            tasks.sort_by(|x, y| sort.compare(x, y));
            assert_eq!(tasks.last().map(|t| t.id), Some(3));
        }
    }

    #[test]
    fn test_priority_sort_uses_rank_with_id_tiebreak() {
        let mut low = task(1);
        low.priority = TaskPriority::Low;
        let mut urgent = task(2);
        urgent.priority = TaskPriority::Urgent;
        let mut urgent_too = task(3);
        urgent_too.priority = TaskPriority::Urgent;

        let sort = TaskSort {
            field: SortField::Priority,
            order: SortOrder::Desc,
        };
        let mut tasks = vec![low, urgent, urgent_too];
        tasks.sort_by(|x, y| sort.compare(x, y));
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }
}

//! Filter options: distinct status, priority and tag values with counts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::TaskPriority;

/// One facet value and how many tasks carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub count: u64,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        let value = value.into();
        Self {
            label: title_case(&value),
            value,
            count,
        }
    }
}

/// Reserved for date bounds; always serialized as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRanges {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub statuses: Vec<FilterOption>,
    pub priorities: Vec<FilterOption>,
    pub tags: Vec<FilterOption>,
    pub date_ranges: DateRanges,
}

impl FilterOptions {
    /// Statuses and tags are ordered by value, priorities by rank.
    pub fn from_counts(
        mut statuses: Vec<(String, u64)>,
        mut priorities: Vec<(TaskPriority, u64)>,
        mut tags: Vec<(String, u64)>,
    ) -> Self {
        statuses.sort();
        priorities.sort();
        tags.sort();

        Self {
            statuses: statuses
                .into_iter()
                .map(|(value, count)| FilterOption::new(value, count))
                .collect(),
            priorities: priorities
                .into_iter()
                .map(|(priority, count)| FilterOption::new(priority.to_string(), count))
                .collect(),
            tags: tags
                .into_iter()
                .map(|(value, count)| FilterOption::new(value, count))
                .collect(),
            date_ranges: DateRanges::default(),
        }
    }
}

/// Uppercase the first letter of every alphabetic run and lowercase the
/// rest, so `in_progress` becomes `In_Progress`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for c in value.chars() {
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphabetic();
    }
    out
}

//! Task listing and write metrics.

use metrics::{counter, histogram};
use std::time::Duration;

pub const TASK_LIST_REQUESTS: &str = "task_list_requests_total";
pub const TASK_LIST_RESULTS: &str = "task_list_results";
pub const TASK_LIST_MATCHED: &str = "task_list_matched";
pub const TASK_LIST_DURATION: &str = "task_list_duration_seconds";
pub const TASK_FILTER_REJECTIONS: &str = "task_filter_rejections_total";
pub const TASK_WRITES: &str = "task_writes_total";

/// Task metrics recorder
pub struct TaskMetrics;

impl TaskMetrics {
    /// Record a served listing page.
    pub fn record_list(returned: usize, matched: u64, duration: Duration) {
        counter!(TASK_LIST_REQUESTS).increment(1);
        histogram!(TASK_LIST_RESULTS).record(returned as f64);
        histogram!(TASK_LIST_MATCHED).record(matched as f64);
        histogram!(TASK_LIST_DURATION).record(duration.as_secs_f64());

        tracing::debug!(
            returned = returned,
            matched = matched,
            duration_ms = duration.as_millis() as u64,
            "Listed tasks"
        );
    }

    /// Record one rejected filter field.
    pub fn record_filter_rejection(field: &str) {
        counter!(TASK_FILTER_REJECTIONS, "field" => field.to_string()).increment(1);
    }

    pub fn record_created() {
        counter!(TASK_WRITES, "operation" => "create").increment(1);
    }

    pub fn record_updated() {
        counter!(TASK_WRITES, "operation" => "update").increment(1);
    }

    pub fn record_deleted() {
        counter!(TASK_WRITES, "operation" => "delete").increment(1);
    }
}

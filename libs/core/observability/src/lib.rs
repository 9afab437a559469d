//! Observability utilities for the task scheduler.
//!
//! - Prometheus metrics recording and export
//! - Task listing and filter metrics
//! - Axum middleware for automatic request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, TaskMetrics};
//!
//! init_metrics()?;
//!
//! TaskMetrics::record_list(20, 143, duration);
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod middleware;
pub mod tasks;

pub use middleware::metrics_middleware;
pub use tasks::TaskMetrics;

pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Installs the global recorder on the first call; later calls return the
/// same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Get the metrics handle (None until `init_metrics` succeeds)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for the /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    // HTTP metrics
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Task metrics
    describe_counter!(
        tasks::TASK_LIST_REQUESTS,
        "Filtered task listing requests served"
    );
    describe_histogram!(
        tasks::TASK_LIST_RESULTS,
        "Tasks returned per listing page"
    );
    describe_histogram!(
        tasks::TASK_LIST_MATCHED,
        "Tasks matching the filter per listing request"
    );
    describe_histogram!(
        tasks::TASK_LIST_DURATION,
        "Count plus page fetch duration in seconds"
    );
    describe_counter!(
        tasks::TASK_FILTER_REJECTIONS,
        "Listing requests rejected by filter validation, by field"
    );
    describe_counter!(
        tasks::TASK_WRITES,
        "Task create/update/delete operations"
    );
}

//! HTTP request metrics for axum routers.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Method, Request, Response, StatusCode},
    middleware::Next,
};
use metrics::{counter, histogram};
use std::time::Instant;

/// Route label for requests no route matched. Raw URIs are never used as
/// labels so unknown paths cannot grow the series count.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Labels shared by every series one request produces.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestLabels {
    method: String,
    route: String,
}

impl RequestLabels {
    fn new(method: &Method, matched_path: Option<&MatchedPath>) -> Self {
        Self {
            method: method.as_str().to_string(),
            route: matched_path
                .map(|p| p.as_str().to_string())
                .unwrap_or_else(|| UNMATCHED_ROUTE.to_string()),
        }
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

/// Records `http_requests_total`, `http_request_duration_seconds` and, for
/// 4xx/5xx, `http_requests_errors_total`, labelled by method and route
/// template (`/api/tasks/{id}`, not `/api/tasks/7`).
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/tasks", get(list))
///     .layer(axum::middleware::from_fn(metrics_middleware));
/// ```
pub async fn metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let labels = RequestLabels::new(request.method(), matched_path.as_ref());
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed = started.elapsed().as_secs_f64();
    let status = response.status();
    let code = status.as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => labels.method.clone(),
        "path" => labels.route.clone(),
        "status" => code.clone(),
        "status_class" => status_class(status)
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => labels.method.clone(),
        "path" => labels.route.clone()
    )
    .record(elapsed);

    if status.is_client_error() || status.is_server_error() {
        counter!(
            "http_requests_errors_total",
            "method" => labels.method,
            "path" => labels.route,
            "status" => code
        )
        .increment(1);
    }

    response
}

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    IdPath, QueryParams, ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, InternalServerErrorResponse, InvalidQueryResponse,
        NotFoundResponse, ValidationErrorResponse,
    },
};
use chrono::Utc;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::TaskResult;
use crate::facets::{DateRanges, FilterOption, FilterOptions};
use crate::filter::TaskFilterQuery;
use crate::models::{
    CreateTask, PaginatedTasks, TaskPriority, TaskResponse, UpdateTask,
};
use crate::repository::TaskRepository;
use crate::service::TaskService;

pub const TAG: &str = "tasks";

/// OpenAPI documentation for the Tasks API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_tasks,
        filter_options,
        create_task,
        get_task,
        update_task,
        delete_task,
    ),
    components(
        schemas(
            TaskResponse,
            TaskPriority,
            CreateTask,
            UpdateTask,
            PaginatedTasks,
            FilterOption,
            FilterOptions,
            DateRanges
        ),
        responses(
            NotFoundResponse,
            ValidationErrorResponse,
            InvalidQueryResponse,
            BadRequestIdResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Task listing, filtering and management")
    )
)]
pub struct ApiDoc;

/// Create the task router with all HTTP endpoints
pub fn router<R: TaskRepository + 'static>(service: TaskService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/filter-options", get(filter_options))
        .route(
            "/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .with_state(shared_service)
}

/// List tasks with filters, sorting and pagination
///
/// `status`, `priority` and `tags` may be repeated. A page past the end
/// returns an empty `tasks` list with accurate counts.
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(TaskFilterQuery),
    responses(
        (status = 200, description = "One page of matching tasks", body = PaginatedTasks),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn list_tasks<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    QueryParams(query): QueryParams<TaskFilterQuery>,
) -> TaskResult<Json<PaginatedTasks>> {
    let page = service.list_tasks(query).await?;
    Ok(Json(page))
}

/// Distinct statuses, priorities and tags with task counts
#[utoipa::path(
    get,
    path = "/filter-options",
    tag = TAG,
    responses(
        (status = 200, description = "Facet values over all tasks", body = FilterOptions),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn filter_options<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
) -> TaskResult<Json<FilterOptions>> {
    let options = service.filter_options().await?;
    Ok(Json(options))
}

/// Create a new task
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created successfully", body = TaskResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn create_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateTask>,
) -> TaskResult<impl IntoResponse> {
    let task = service.create_task(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse::from_task(task, Utc::now())),
    ))
}

/// Get a task by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = TaskResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn get_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    IdPath(id): IdPath,
) -> TaskResult<impl IntoResponse> {
    let task = service.get_task(id).await?;
    Ok(Json(TaskResponse::from_task(task, Utc::now())))
}

/// Update a task; absent fields are left unchanged
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Task ID")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Task updated successfully", body = TaskResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn update_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateTask>,
) -> TaskResult<impl IntoResponse> {
    let task = service.update_task(id, input).await?;
    Ok(Json(TaskResponse::from_task(task, Utc::now())))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted successfully"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn delete_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    IdPath(id): IdPath,
) -> TaskResult<impl IntoResponse> {
    service.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

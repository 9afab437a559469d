//! Tasks Domain
//!
//! Task storage plus the filtered listing: parameter validation, predicate
//! composition, pagination and filter-option facets.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP routes, OpenAPI
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, count + page, metrics
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │ Repository  │  ← Trait; in-memory and PostgreSQL stores
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │ Query/Models│  ← Predicates, sort, entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tasks::{handlers, PgTaskRepository, TaskService};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//!
//! let service = TaskService::new(PgTaskRepository::new(db));
//! let routes = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod facets;
pub mod filter;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repository;
pub mod service;

pub use error::{TaskError, TaskResult};
pub use facets::{FilterOption, FilterOptions};
pub use filter::{SortField, SortOrder, TaskFilterParams, TaskFilterQuery};
pub use handlers::ApiDoc;
pub use memory::InMemoryTaskRepository;
pub use models::{
    CreateTask, PaginatedTasks, STATUS_CANCELLED, STATUS_COMPLETED, STATUS_IN_PROGRESS,
    STATUS_PENDING, Task, TaskPriority, TaskResponse, UnknownPriority, UpdateTask,
};
pub use postgres::PgTaskRepository;
pub use query::{Predicate, TaskQuery, TaskSort, compose};
pub use repository::TaskRepository;
pub use service::TaskService;

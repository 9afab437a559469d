//! PostgreSQL connectivity for the task scheduler.
//!
//! - `config` - `core_config::FromEnv` support for [`postgres::PostgresConfig`]
//!
//! ```ignore
//! use database::{common::RetryConfig, postgres};
//!
//! let db = postgres::connect_with_retry(&config, RetryConfig::default()).await?;
//! postgres::run_migrations::<migration::Migrator>(&db, "scheduler_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};

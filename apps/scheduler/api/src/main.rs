use axum::middleware;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use database::postgres::{connect_with_retry, run_migrations};
use domain_tasks::InMemoryTaskRepository;
use observability::metrics_middleware;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::{Config, StoreConfig};
use state::{AppState, TaskStore};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Colored error reports before any fallible step
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    if config.metrics_enabled {
        observability::init_metrics()
            .map_err(|e| eyre::eyre!("Metrics recorder failed: {}", e))?;
    }

    let store = match &config.store {
        StoreConfig::Postgres {
            database,
            run_migrations: migrate,
        } => {
            let db = connect_with_retry(database, RetryConfig::default())
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

            if *migrate {
                run_migrations::<migration::Migrator>(&db, config.app.name)
                    .await
                    .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
            }

            TaskStore::Postgres(db)
        }
        StoreConfig::Memory => {
            warn!("Using the in-memory task store; tasks are lost on restart");
            TaskStore::Memory(InMemoryTaskRepository::new())
        }
    };

    let state = AppState { config, store };

    let api_routes = api::routes(&state);

    // create_router adds docs, the /api prefix and middleware
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // /health: liveness with app name/version
    // /ready: readiness against the task store
    let mut app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    if state.config.metrics_enabled {
        app = app
            .merge(api::metrics_router())
            .layer(middleware::from_fn(metrics_middleware));
    }

    info!(
        store = ?state.config.store.kind(),
        "Starting scheduler API"
    );

    let AppState { config, store } = state;
    create_production_app(app, &config.server, config.server.shutdown_timeout, async move {
        match store {
            TaskStore::Postgres(db) => match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            },
            TaskStore::Memory(_) => info!("In-memory task store dropped"),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Scheduler API shutdown complete");
    Ok(())
}

use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, env_parse_or, server::ServerConfig};
use database::postgres::PostgresConfig;
use strum::EnumString;

pub use core_config::Environment;

/// Which task store backs the API, from `TASK_STORE`
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// Store settings; only the PostgreSQL store carries connection config
#[derive(Clone, Debug)]
pub enum StoreConfig {
    Postgres {
        database: PostgresConfig,
        run_migrations: bool,
    },
    Memory,
}

impl StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let kind: StoreKind = env_parse_or("TASK_STORE", "postgres")?;

        match kind {
            StoreKind::Postgres => Ok(Self::Postgres {
                database: PostgresConfig::from_env()?,
                run_migrations: env_parse_or("RUN_MIGRATIONS", "true")?,
            }),
            StoreKind::Memory => Ok(Self::Memory),
        }
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            Self::Postgres { .. } => StoreKind::Postgres,
            Self::Memory => StoreKind::Memory,
        }
    }
}

/// Application-specific configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Expose Prometheus text format at `/metrics`
    pub metrics_enabled: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let store = StoreConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let metrics_enabled = env_or_default("METRICS_ENABLED", "true") != "false";

        Ok(Self {
            app: app_info!(),
            store,
            server,
            environment,
            metrics_enabled,
        })
    }
}

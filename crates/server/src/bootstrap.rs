use thiserror::Error;
use tracing::info;

use lodgr_core::config::{AppConfig, ConfigError, LoadOptions};
use lodgr_db::{connect_with_settings, migrations, DbPool, InventoryLedger};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub ledger: InventoryLedger,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let ledger = InventoryLedger::new(db_pool.clone());
    Ok(Application { config, db_pool, ledger })
}

#[cfg(test)]
mod tests {
    use lodgr_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use super::{bootstrap, bootstrap_with_config};

    #[tokio::test]
    async fn bootstrap_with_in_memory_database_succeeds() {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;

        let app = bootstrap_with_config(config).await.expect("bootstrap");
        let ping: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&app.db_pool)
            .await
            .expect("database reachable");
        assert_eq!(ping, 1);
    }

    #[tokio::test]
    async fn bootstrap_honors_database_override() {
        let options = LoadOptions {
            config_path: Some(std::path::PathBuf::from("/definitely/not/here/lodgr.toml")),
            require_file: false,
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                log_level: None,
            },
        };

        let app = bootstrap(options).await.expect("bootstrap");
        assert_eq!(app.config.database.url, "sqlite::memory:");
    }
}

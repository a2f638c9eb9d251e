pub mod transaction;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::migrator::Migrator;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub use transaction::with_transaction;

pub type DbPool = DatabaseConnection;

/// Pool tuning for the ledger store.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    /// Connections unused for this long are closed.
    pub idle_timeout: Duration,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl DbConfig {
    fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.as_str());
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .sqlx_logging(false);
        options
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(app: &AppConfig) -> Self {
        let secs = Duration::from_secs;
        DbConfig {
            url: app.database_url.clone(),
            max_connections: app.db_max_connections,
            min_connections: app.db_min_connections,
            connect_timeout: secs(app.db_connect_timeout_secs),
            idle_timeout: secs(app.db_idle_timeout_secs),
            acquire_timeout: secs(app.db_acquire_timeout_secs),
        }
    }
}

/// Opens the pool described by `settings`.
pub async fn establish_connection_with_config(settings: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!(?settings, "opening ledger store");

    match Database::connect(settings.connect_options()).await {
        Ok(pool) => {
            info!(
                max_connections = settings.max_connections,
                backend = ?pool.get_database_backend(),
                "ledger store connected"
            );
            Ok(pool)
        }
        Err(err) => {
            error!(error = %err, "could not connect to the ledger store");
            Err(err.into())
        }
    }
}

pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    establish_connection_with_config(&DbConfig::from(cfg)).await
}

/// Brings the schema up to date. Already applied migrations are skipped.
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    let started = Instant::now();
    let pending = Migrator::get_pending_migrations(pool).await?.len();
    info!(pending, "applying schema migrations");

    if let Err(err) = Migrator::up(pool, None).await {
        error!(error = %err, elapsed = ?started.elapsed(), "schema migration failed");
        return Err(err.into());
    }

    info!(applied = pending, elapsed = ?started.elapsed(), "schema is current");
    Ok(())
}

/// Round trip to the store, used by the health endpoint.
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    pool.ping().await.map_err(|err| {
        error!(error = %err, "ledger store ping failed");
        ServiceError::from(err)
    })
}

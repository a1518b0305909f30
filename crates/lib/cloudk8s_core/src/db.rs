//! PostgreSQL connection pool wrapper.
//!
//! `Database` owns the shared `PgPool`. The pool is sized to the number of
//! CPUs, and the first connection must succeed within the startup timeout.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, DbConfig};
use crate::health::HealthCheck;

/// Maximum time allowed for the initial connection check.
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Invalid database configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Database not reachable after {0:?}")]
    ConnectTimeout(Duration),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Shared handle to the application database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connects with a pool of one connection per CPU and verifies the
    /// connection by reading the server version.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        Self::connect_within(config, STARTUP_TIMEOUT).await
    }

    /// Like [`Database::connect`], giving up after `timeout`.
    pub async fn connect_within(config: &DbConfig, timeout: Duration) -> Result<Self> {
        let url = config.connection_url()?;
        let max_connections = pool_size();
        info!(
            url = %config.redacted_url(),
            max_connections,
            "connecting to database"
        );

        let connect = async {
            let pool = PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(timeout)
                .connect(&url)
                .await?;
            let db = Database { pool };
            let version = db.version().await?;
            info!(%version, "connected to database");
            Ok::<_, DbError>(db)
        };
        tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| DbError::ConnectTimeout(timeout))?
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Server version string, `SELECT version()`.
    pub async fn version(&self) -> Result<String> {
        let version = sqlx::query_scalar::<_, String>("SELECT version()")
            .fetch_one(&self.pool)
            .await?;
        Ok(version)
    }

    /// True when a trivial query succeeds.
    pub async fn health_check(&self) -> Result<bool> {
        let one = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(one == 1)
    }

    pub async fn table_exists(&self, schema: &str, table: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables \
             WHERE table_schema = $1 AND table_name = $2)",
        )
        .bind(schema)
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Waits for checked-out connections and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}

#[async_trait]
impl HealthCheck for Database {
    async fn is_ok(&self) -> bool {
        match self.health_check().await {
            Ok(alive) => alive,
            Err(e) => {
                warn!(error = %e, "database health check failed");
                false
            }
        }
    }
}

fn pool_size() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

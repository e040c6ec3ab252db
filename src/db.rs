use std::time::Duration;

use log::{error, info};
use sqlx::{
    PgPool, Postgres,
    pool::PoolConnection,
    postgres::{PgConnectOptions, PgPoolOptions},
};

use crate::{config::DbSettings, error::AppError};

/// Owned handle to the single-connection pool.
///
/// Built once before the server starts. When the settings are incomplete no
/// pool exists and every acquisition reports the configuration error.
pub struct Database {
    pool: Result<PgPool, String>,
    host: String,
}

impl Database {
    pub fn new(settings: &DbSettings) -> Self {
        let host = settings.host_label();

        match settings.connect_options() {
            Ok(options) => Self::with_options(options, settings.connect_timeout, host),
            Err(e) => {
                error!("{}", e);
                Database {
                    pool: Err(e.to_string()),
                    host,
                }
            }
        }
    }

    /// Lazily connected: nothing touches the network until the first
    /// acquisition.
    pub fn with_options(
        options: PgConnectOptions,
        connect_timeout: Duration,
        host: String,
    ) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .acquire_timeout(connect_timeout)
            .connect_lazy_with(options);
        info!("Database connection pool created for {}", host);

        Database {
            pool: Ok(pool),
            host,
        }
    }

    pub fn pool(&self) -> Result<&PgPool, AppError> {
        self.pool.as_ref().map_err(|msg| AppError::Config(msg.clone()))
    }

    /// Takes the pooled connection. It goes back to the pool when the
    /// returned guard is dropped, on every exit path.
    pub async fn acquire(&self, operation: &str) -> Result<PoolConnection<Postgres>, AppError> {
        let pool = self.pool()?;
        pool.acquire().await.map_err(|e| {
            error!(
                "Database connection error ({}) while connecting to {}: {}",
                operation, self.host, e
            );
            AppError::from(e)
        })
    }

    /// Connections currently held by the pool, idle or checked out.
    pub fn connections(&self) -> u32 {
        self.pool.as_ref().map(|p| p.size()).unwrap_or(0)
    }

    pub async fn close(&self) {
        if let Ok(pool) = &self.pool {
            pool.close().await;
            info!("Database connection pool closed");
        }
    }
}

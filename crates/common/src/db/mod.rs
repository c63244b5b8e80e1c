//! Database layer for Vaultify
//!
//! Provides:
//! - SeaORM entity for paper records
//! - Repository pattern for data access (including the duplicate check)
//! - Connection pool management

pub mod models;
mod repository;

pub use repository::{NewPaper, PaperFilter, Repository};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    /// Primary connection (for writes)
    pub primary: DatabaseConnection,

    /// Read replica connection (optional)
    pub replica: Option<DatabaseConnection>,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to primary database...");

        let primary = Self::connect(&config.url, config).await?;

        let replica = match config.read_url {
            Some(ref read_url) => {
                info!("Connecting to read replica...");
                Some(Self::connect(read_url, config).await?)
            }
            None => None,
        };

        info!("Database connections established");

        Ok(Self { primary, replica })
    }

    async fn connect(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opts = ConnectOptions::new(url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e),
            })
    }

    /// Get the connection for reads (replica if available, otherwise primary)
    pub fn read(&self) -> &DatabaseConnection {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    /// Get the connection for writes (always primary)
    pub fn write(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;

        self.primary
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Primary ping failed: {}", e),
            })?;

        if let Some(ref replica) = self.replica {
            replica
                .execute_unprepared("SELECT 1")
                .await
                .map_err(|e| AppError::DatabaseConnection {
                    message: format!("Replica ping failed: {}", e),
                })?;
        }

        Ok(())
    }
}

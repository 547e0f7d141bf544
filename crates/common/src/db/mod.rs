//! Database layer for Precis
//!
//! Provides:
//! - SeaORM entity models
//! - Repository pattern for data access
//! - Connection pool management
//! - Schema bootstrap

pub mod models;
mod repository;

pub use repository::{NewContent, Repository};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use models::{ContentColumn, ContentEntity, UserEntity};
use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e)
            })?;

        info!("Database connection established");

        Ok(Self { conn })
    }

    /// Wrap an already-open connection
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }

    /// Create the tables and indexes if they do not exist yet
    pub async fn migrate(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut users = schema.create_table_from_entity(UserEntity);
        users.if_not_exists();
        self.conn.execute(backend.build(&users)).await?;

        let mut contents = schema.create_table_from_entity(ContentEntity);
        contents.if_not_exists();
        self.conn.execute(backend.build(&contents)).await?;

        let owner_index = Index::create()
            .name("idx_contents_user_id")
            .table(ContentEntity)
            .col(ContentColumn::UserId)
            .if_not_exists()
            .to_owned();
        self.conn.execute(backend.build(&owner_index)).await?;

        info!("Database schema ready");
        Ok(())
    }
}

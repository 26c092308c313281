//! # Database Module
//!
//! This module handles all persistence for the credit service.
//!
//! The orchestrator only sees the [`CreditStore`] trait. Two
//! implementations exist:
//!
//! - [`Database`] - PostgreSQL through a deadpool connection pool
//! - [`InMemoryCreditStore`] - a process-local map, used by tests and
//!   by `CREDIT_STORE=memory`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      DATABASE LAYER                              │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │                 CreditStore (trait)                        │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! │                 │                              │                 │
//! │                 ▼                              ▼                 │
//! │  ┌────────────────────────────┐   ┌─────────────────────────┐   │
//! │  │ Database                   │   │ InMemoryCreditStore     │   │
//! │  │ (deadpool-postgres)        │   │ (RwLock<HashMap>)       │   │
//! │  │   └─ credits table         │   │                         │   │
//! │  └────────────────────────────┘   └─────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod memory;
pub mod models;
pub mod queries;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use deadpool_postgres::{Config, Pool, Runtime};
use thiserror::Error;
use tokio_postgres::{Config as TokioConfig, NoTls};
use tracing::{error, info, warn};

pub use memory::InMemoryCreditStore;
pub use models::*;

/// Schema applied at startup.
const SCHEMA_SQL: &str = include_str!("../../migrations/001_credit_schema.sql");

/// Database-related errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to connect to the database
    #[error("Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryError(#[from] tokio_postgres::Error),

    /// Migration failed
    #[error("Migration failed: {0}")]
    MigrationError(String),

    /// The row to write no longer exists
    #[error("Credit not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Durable keyed storage for credit records.
///
/// Every method is a suspension point; implementations must be safe to
/// share across request handlers.
#[async_trait]
pub trait CreditStore: Send + Sync {
    /// Insert a new credit and return it with its assigned id.
    ///
    /// Fails with [`DatabaseError::UniqueViolation`] when the customer
    /// already owns a `PERSONAL` credit and `new` is one too.
    async fn insert(&self, new: NewCredit) -> Result<Credit, DatabaseError>;

    /// Overwrite an existing credit.
    ///
    /// Fails with [`DatabaseError::NotFound`] when the record is gone;
    /// a deleted credit is never recreated.
    async fn save(&self, credit: &Credit) -> Result<Credit, DatabaseError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Credit>, DatabaseError>;

    async fn find_all(&self) -> Result<Vec<Credit>, DatabaseError>;

    async fn delete(&self, credit: &Credit) -> Result<(), DatabaseError>;

    async fn exists_by_customer_id_and_type(
        &self,
        customer_id: &str,
        credit_type: &str,
    ) -> Result<bool, DatabaseError>;

    async fn find_by_customer_id(&self, customer_id: &str) -> Result<Vec<Credit>, DatabaseError>;

    /// Credits with `start <= created_at <= end`.
    async fn find_all_by_created_at_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Credit>, DatabaseError>;

    /// Whether the store can currently serve requests.
    async fn health_check(&self) -> bool;
}

/// PostgreSQL-backed credit store.
///
/// ## Connection Pooling
///
/// We use deadpool-postgres for connection pooling.
/// This efficiently manages database connections.
///
/// ## Usage
///
/// ```rust,ignore
/// let db = Database::connect("postgres://...", 10).await?;
/// db.run_migrations().await?;
/// let credit = db.find_by_id("9f1c...").await?;
/// ```
#[derive(Clone)]
pub struct Database {
    /// The connection pool
    pool: Pool,
}

impl Database {
    /// Connect to the PostgreSQL database.
    ///
    /// ## Arguments
    ///
    /// * `database_url` - PostgreSQL connection string
    /// * `pool_size` - Maximum number of pooled connections
    ///
    /// ## Returns
    ///
    /// * `Ok(Database)` - Connected successfully
    /// * `Err(DatabaseError)` - Connection failed
    pub async fn connect(database_url: &str, pool_size: usize) -> Result<Self, DatabaseError> {
        info!("Connecting to database...");

        // Parse the connection string using tokio_postgres::Config
        let tokio_config = database_url
            .parse::<TokioConfig>()
            .map_err(|e| DatabaseError::ConfigError(format!("Invalid database URL: {}", e)))?;

        // Convert to deadpool config
        let mut config = Config::new();

        if let Some(dbname) = tokio_config.get_dbname() {
            config.dbname = Some(dbname.to_string());
        }
        if let Some(user) = tokio_config.get_user() {
            config.user = Some(user.to_string());
        }
        if let Some(password) = tokio_config.get_password() {
            config.password = Some(String::from_utf8_lossy(password).to_string());
        }
        if let Some(tokio_postgres::config::Host::Tcp(host)) = tokio_config.get_hosts().first() {
            config.host = Some(host.clone());
        }
        if let Some(port) = tokio_config.get_ports().first() {
            config.port = Some(*port);
        }

        config.pool = Some(deadpool_postgres::PoolConfig {
            max_size: pool_size,
            ..Default::default()
        });

        let pool = config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        // Test connection
        let client = pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        client
            .query("SELECT 1", &[])
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Database connection established (pool size: {})", pool_size);

        Ok(Self { pool })
    }

    /// Apply the credit schema.
    ///
    /// The schema uses `IF NOT EXISTS` throughout; an "already exists"
    /// error from an older server is logged and tolerated.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        info!("Running database migrations...");

        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        match client.batch_execute(SCHEMA_SQL).await {
            Ok(_) => {
                info!("Migrations completed successfully");
                Ok(())
            }
            Err(e) => {
                let error_code = e.code().map(|c| c.code().to_string());

                // 42P07 = duplicate_table, 42710 = duplicate_object
                let is_duplicate_error = matches!(error_code.as_deref(), Some("42P07") | Some("42710"));

                if is_duplicate_error || e.to_string().contains("already exists") {
                    warn!(
                        "Some database objects already exist (error code: {:?}); continuing",
                        error_code
                    );
                    Ok(())
                } else {
                    error!("Migration execution error: {} (code: {:?})", e, error_code);
                    Err(DatabaseError::MigrationError(e.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl CreditStore for Database {
    async fn insert(&self, new: NewCredit) -> Result<Credit, DatabaseError> {
        queries::insert_credit(&self.pool, new).await
    }

    async fn save(&self, credit: &Credit) -> Result<Credit, DatabaseError> {
        queries::update_credit(&self.pool, credit).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Credit>, DatabaseError> {
        queries::get_credit_by_id(&self.pool, id).await
    }

    async fn find_all(&self) -> Result<Vec<Credit>, DatabaseError> {
        queries::get_all_credits(&self.pool).await
    }

    async fn delete(&self, credit: &Credit) -> Result<(), DatabaseError> {
        queries::delete_credit(&self.pool, &credit.id).await
    }

    async fn exists_by_customer_id_and_type(
        &self,
        customer_id: &str,
        credit_type: &str,
    ) -> Result<bool, DatabaseError> {
        queries::credit_exists_for_customer(&self.pool, customer_id, credit_type).await
    }

    async fn find_by_customer_id(&self, customer_id: &str) -> Result<Vec<Credit>, DatabaseError> {
        queries::get_credits_by_customer(&self.pool, customer_id).await
    }

    async fn find_all_by_created_at_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Credit>, DatabaseError> {
        queries::get_credits_created_between(&self.pool, start, end).await
    }

    async fn health_check(&self) -> bool {
        match self.pool.get().await {
            Ok(client) => client.query("SELECT 1", &[]).await.is_ok(),
            Err(_) => false,
        }
    }
}

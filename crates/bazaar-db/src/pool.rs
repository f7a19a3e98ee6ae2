//! # Database Pool Management
//!
//! Connection pool creation, health checking and repository access.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Process startup                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::from_env() ← Validated settings                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::connect(&config).await ← Create pool + ping                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            AnyPool                       │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │  min..=max connections    │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  Postgres or SQLite,      │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │  picked by URL scheme     │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ Concurrent RPC handlers                                        │
//! │       ▼                                                                 │
//! │  db.items().create(..)  ──► Store::with_tx    ──► one connection       │
//! │  db.orders().list()     ──► Store::without_tx ──► one connection       │
//! │  (callers beyond max wait for a release, up to their deadline)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tokio::time::timeout;
use tracing::{error, info};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::repository::item::ItemRepository;
use crate::repository::order::OrderRepository;
use crate::repository::seller::SellerRepository;
use crate::repository::user::UserRepository;
use crate::store::Store;

/// Main database handle providing repository access.
///
/// ## Usage in RPC Handlers
/// ```rust,ignore
/// async fn get_item(&self, request: Request<GetItemRequest>) -> Result<Response<Item>, Status> {
///     let item = self.db.items().get(&request.get_ref().id).await?;
///     Ok(Response::new(item.into()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The connection pool.
    pool: AnyPool,

    /// Per-unit-of-work budget handed to every [`Store`].
    timeout: Duration,
}

impl Database {
    /// Creates the connection pool and verifies it with a ping.
    ///
    /// ## What This Does
    /// 1. Registers the Postgres and SQLite drivers
    /// 2. Creates the pool with the configured bounds; acquiring a
    ///    connection waits at most `config.timeout`
    /// 3. Pings the backend
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError::ConnectionFailed)` - Pool creation or ping failed
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        sqlx::any::install_default_drivers();

        let dsn = config.redacted_url();
        info!(
            dsn = %dsn,
            min_connections = config.min_connections,
            max_connections = config.max_connections,
            "Creating database connection pool"
        );

        let pool = AnyPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.timeout)
            .connect(&config.connection_url())
            .await
            .map_err(|e| {
                error!(dsn = %dsn, error = %e, "Failed to create connection pool");
                DbError::ConnectionFailed(e)
            })?;

        let db = Database {
            pool,
            timeout: config.timeout,
        };

        if let Err(e) = db.ping().await {
            error!(dsn = %dsn, error = %e, "Failed to ping database");
            db.pool.close().await;
            return Err(e);
        }

        info!(dsn = %dsn, "Database connected");
        Ok(db)
    }

    /// Runs one round trip against the backend.
    pub async fn ping(&self) -> DbResult<()> {
        match timeout(self.timeout, sqlx::query("SELECT 1").execute(&self.pool)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(sqlx::Error::PoolTimedOut)) | Err(_) => Err(DbError::DeadlineExceeded),
            Ok(Err(e)) => Err(DbError::ConnectionFailed(e)),
        }
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        self.ping().await.is_ok()
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Number of open connections, idle or in use.
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    /// Number of open connections currently idle.
    pub fn num_idle(&self) -> usize {
        self.pool.num_idle()
    }

    /// Returns the transaction coordinator bound to this pool.
    pub fn store(&self) -> Store {
        Store::new(self.pool.clone(), self.timeout)
    }

    /// Returns the item repository.
    pub fn items(&self) -> ItemRepository {
        ItemRepository::new(self.store())
    }

    /// Returns the user repository.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.store())
    }

    /// Returns the seller repository.
    pub fn sellers(&self) -> SellerRepository {
        SellerRepository::new(self.store())
    }

    /// Returns the order repository.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.store())
    }

    /// Closes the connection pool.
    ///
    /// ## Note
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.size(), 1);
    }

    #[tokio::test]
    async fn test_closed_pool_is_unhealthy() {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails_to_connect() {
        let mut config = DbConfig::in_memory().timeout(Duration::from_millis(200));
        config.url_override = Some("sqlite:///nonexistent-dir/bazaar.db".to_string());

        let err = Database::connect(&config).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}

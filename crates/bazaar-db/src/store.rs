//! # Transaction Coordinator
//!
//! Bounds the lifetime and atomicity of one unit of work.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Store::with_tx(f)                                   │
//! │                                                                         │
//! │  deadline = min(now + timeout, inherited deadline)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ──── error ──────────────────────────────► BeginFailed          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  f(&mut conn) ── Ok ──► COMMIT ── error ────────► CommitFailed         │
//! │       │                    └───── ok ───────────► Ok(value)            │
//! │       │ Err(e)                                                          │
//! │       ▼                                                                 │
//! │  ROLLBACK ── ok ────────────────────────────────► FunctionFailed(e)    │
//! │       └───── error r ───────────────────────────► RollbackFailed(r, e) │
//! │                                                                         │
//! │  deadline hit anywhere ─► future dropped, sqlx rolls back on drop,     │
//! │                           connection returns to pool ► DeadlineExceeded│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transaction is only lent to `f` for the duration of the call, so it
//! cannot be used after `f` returns. Nested `with_tx` calls are not
//! supported: a unit of work owns exactly one transaction.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::any::Any;
use sqlx::{AnyConnection, AnyPool, Transaction};
use tokio::time::{timeout_at, Instant};
use tracing::{error, warn};

use crate::error::{DbError, DbResult};

/// Future returned by a transaction-scoped function.
pub type TxFuture<'c, T> = BoxFuture<'c, DbResult<T>>;

/// Runs units of work against the pool, with or without a transaction.
///
/// Cloning is cheap: the pool handle is reference counted.
#[derive(Debug, Clone)]
pub struct Store {
    pool: AnyPool,
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Store {
    /// Creates a store whose units of work each get `timeout`.
    pub fn new(pool: AnyPool, timeout: Duration) -> Self {
        Store {
            pool,
            timeout,
            deadline: None,
        }
    }

    /// Returns a store whose units of work also end no later than
    /// `deadline`.
    ///
    /// Use this to carry a caller's deadline (for example an RPC deadline)
    /// into the data-access layer: the nearer of the two always wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        };
        Store {
            pool: self.pool.clone(),
            timeout: self.timeout,
            deadline: Some(deadline),
        }
    }

    /// The configured per-unit-of-work timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The pool this store draws connections from.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    fn deadline(&self) -> Instant {
        let own = Instant::now() + self.timeout;
        match self.deadline {
            Some(inherited) if inherited < own => inherited,
            _ => own,
        }
    }

    /// Runs `f` inside a transaction and commits if it succeeds.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let item = item.clone();
    /// let created = store
    ///     .with_tx(move |conn| Box::pin(async move { ItemQuery.create(conn, &item).await }))
    ///     .await?;
    /// ```
    ///
    /// The returned future borrows the connection, so anything else it needs
    /// must be moved in (clone owned data before the closure).
    pub async fn with_tx<T, F>(&self, f: F) -> DbResult<T>
    where
        F: for<'c> FnOnce(&'c mut AnyConnection) -> TxFuture<'c, T> + Send,
        T: Send,
    {
        match timeout_at(self.deadline(), self.run_in_tx(f)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.timeout, "Transaction exceeded its deadline");
                Err(DbError::DeadlineExceeded)
            }
        }
    }

    async fn run_in_tx<T, F>(&self, f: F) -> DbResult<T>
    where
        F: for<'c> FnOnce(&'c mut AnyConnection) -> TxFuture<'c, T> + Send,
        T: Send,
    {
        let mut tx = self.pool.begin().await.map_err(|err| match err {
            sqlx::Error::PoolTimedOut => DbError::DeadlineExceeded,
            other => DbError::BeginFailed(other),
        })?;

        match f(&mut *tx).await {
            Ok(value) => {
                tx.commit().await.map_err(DbError::CommitFailed)?;
                Ok(value)
            }
            Err(err) => Err(rollback(tx, err).await),
        }
    }

    /// Runs `f` against the pool with no transaction boundary.
    ///
    /// For single-statement reads where atomicity adds nothing. `f`'s error
    /// is returned unchanged.
    pub async fn without_tx<T, F, Fut>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(AnyPool) -> Fut,
        Fut: Future<Output = DbResult<T>>,
    {
        match timeout_at(self.deadline(), f(self.pool.clone())).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.timeout, "Pooled call exceeded its deadline");
                Err(DbError::DeadlineExceeded)
            }
        }
    }
}

/// Rolls back after `f` failed, composing both errors if rollback fails too.
async fn rollback(tx: Transaction<'static, Any>, err: DbError) -> DbError {
    match tx.rollback().await {
        Ok(()) => DbError::FunctionFailed(Box::new(err)),
        Err(rollback) => {
            error!(error = %rollback, original_error = %err, "Rollback error");
            DbError::RollbackFailed {
                rollback,
                original: Box::new(err),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ItemQuery;
    use crate::repository::Repository;
    use crate::{Database, DbConfig};
    use bazaar_core::Item;

    async fn store(timeout: Duration) -> Store {
        let db = Database::connect(&DbConfig::in_memory().timeout(timeout))
            .await
            .unwrap();
        db.store()
    }

    #[tokio::test]
    async fn test_with_tx_returns_value_on_commit() {
        let store = store(Duration::from_secs(5)).await;

        let value: i64 = store
            .with_tx(|conn| {
                Box::pin(async move {
                    let n: i64 = sqlx::query_scalar("SELECT 41 + 1")
                        .fetch_one(&mut *conn)
                        .await
                        .map_err(DbError::Backend)?;
                    Ok(n)
                })
            })
            .await
            .unwrap();

        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_function_error_passed_through_wrapped() {
        let store = store(Duration::from_secs(5)).await;

        let err = store
            .with_tx(|_conn| Box::pin(async move { Err::<(), _>(DbError::not_found("item", "i1")) }))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::FunctionFailed(_)));
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_without_tx_times_out() {
        let store = store(Duration::from_millis(50)).await;

        let err = store
            .without_tx(|_pool| async move {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_nearer_inherited_deadline_wins() {
        let store = store(Duration::from_secs(30)).await;
        let scoped = store.with_deadline(Instant::now() + Duration::from_millis(50));

        let started = std::time::Instant::now();
        let err = scoped
            .without_tx(|_pool| async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::DeadlineExceeded);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_later_inherited_deadline_does_not_extend_timeout() {
        let store = store(Duration::from_millis(50)).await;
        let scoped = store.with_deadline(Instant::now() + Duration::from_secs(60));

        let err = scoped
            .without_tx(|_pool| async move {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_failed_unit_leaves_nothing_visible() {
        let db = crate::test_support::setup().await;
        let item = Item::new("i1", "Lamp", "Brass desk lamp");

        let err = db
            .store()
            .with_tx(move |conn| {
                Box::pin(async move {
                    ItemQuery.create(&mut *conn, &item).await?;
                    Err::<(), _>(DbError::not_found("seller", "s1"))
                })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::FunctionFailed(_)));
        let err = db.items().get("i1").await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rollback_failure_keeps_both_causes() {
        let db = crate::test_support::setup().await;

        // ending the transaction early makes the following ROLLBACK fail
        let err = db
            .store()
            .with_tx(|conn| {
                Box::pin(async move {
                    sqlx::query("COMMIT")
                        .execute(&mut *conn)
                        .await
                        .map_err(DbError::Backend)?;
                    Err::<(), _>(DbError::not_found("item", "i1"))
                })
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::RollbackFailed);
        assert_eq!(err.root_kind(), crate::ErrorKind::NotFound);
        assert!(err.rollback_error().is_some());
        assert_eq!(
            err.original().map(DbError::kind),
            Some(crate::ErrorKind::NotFound)
        );
    }

    #[tokio::test]
    async fn test_begin_on_closed_pool_fails() {
        let db = Database::connect(&DbConfig::in_memory()).await.unwrap();
        let store = db.store();
        db.close().await;

        let err = store
            .with_tx(|_conn| Box::pin(async move { Ok(()) }))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::BeginFailed(sqlx::Error::PoolClosed)));
        assert_eq!(err.kind(), crate::ErrorKind::BeginFailed);
    }

    #[tokio::test]
    async fn test_commit_failure_reported() {
        let db = crate::test_support::setup().await;

        // ending the transaction early makes the following COMMIT fail
        let err = db
            .store()
            .with_tx(|conn| {
                Box::pin(async move {
                    sqlx::query("COMMIT")
                        .execute(&mut *conn)
                        .await
                        .map_err(DbError::Backend)?;
                    Ok(())
                })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::CommitFailed(_)));
        assert_eq!(err.kind(), crate::ErrorKind::CommitFailed);
    }
}

//! # Database Error Types
//!
//! The error taxonomy every repository call reports.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Backend error (sqlx::Error, Postgres / SQLite codes)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  translate() ← ONLY place backend codes are inspected (query layer)    │
//! │       │         DuplicateKey / MissingField / NotFound / Backend       │
//! │       ▼                                                                 │
//! │  Store      ← FunctionFailed / RollbackFailed / CommitFailed / ...     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Repository ← Context { "failed to create item" / "transaction failed" }│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RPC handler inspects kind() → tonic::Status                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wrapping never drops a cause: each wrapper keeps the inner error as its
//! `source()`, and [`DbError::root_kind`] / [`DbError::is`] look through
//! every wrapper.

use bazaar_core::ValidationError;
use thiserror::Error;

/// Stable error categories, independent of the backend in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input caught before any backend call.
    InvalidArgument,
    /// Zero rows for a keyed read or update.
    NotFound,
    /// Unique-constraint violation.
    DuplicateKey,
    /// Not-null violation.
    MissingField,
    /// The transaction could not be started.
    BeginFailed,
    /// The transaction could not be committed.
    CommitFailed,
    /// Rollback failed after the unit of work had already failed.
    RollbackFailed,
    /// The unit of work ran past its deadline.
    DeadlineExceeded,
    /// Any other backend failure.
    Backend,
}

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Input rejected before a statement was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - `get` finds no row for the key
    /// - `update` matches no row
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Creating an entity whose `id` already exists
    /// - Referencing the same item twice in one order
    #[error("{entity} with ID {id} already exists: {source}")]
    DuplicateKey {
        entity: &'static str,
        id: String,
        #[source]
        source: sqlx::Error,
    },

    /// Not-null constraint violation.
    #[error("missing required field on {entity}: {source}")]
    MissingField {
        entity: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// `BEGIN` failed.
    #[error("failed to begin transaction: {0}")]
    BeginFailed(#[source] sqlx::Error),

    /// `COMMIT` failed. Commit is never retried.
    #[error("failed to commit transaction: {0}")]
    CommitFailed(#[source] sqlx::Error),

    /// Rollback failed after the transaction function failed.
    ///
    /// Both causes are kept: `original` is the error that triggered the
    /// rollback (also the `source()`), `rollback` is why the rollback failed.
    #[error("rollback error: {rollback} (original error: {original})")]
    RollbackFailed {
        rollback: sqlx::Error,
        #[source]
        original: Box<DbError>,
    },

    /// The function run inside `Store::with_tx` failed and was rolled back.
    #[error("transaction function failed: {0}")]
    FunctionFailed(#[source] Box<DbError>),

    /// The unit of work did not finish before its deadline.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The pool could not be created or reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// Unclassified backend failure.
    #[error("backend error: {0}")]
    Backend(#[source] sqlx::Error),

    /// Operation context added while propagating.
    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<DbError>,
    },
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wraps this error with operation context.
    pub fn context(self, context: &'static str) -> Self {
        DbError::Context {
            context,
            source: Box::new(self),
        }
    }

    /// Kind of this error.
    ///
    /// Pure wrappers (`Context`, `FunctionFailed`) report the kind of what
    /// they wrap, so a `NotFound` raised inside a transaction is still
    /// `NotFound` to the caller. `RollbackFailed` reports itself; use
    /// [`root_kind`](Self::root_kind) for the triggering error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            DbError::MissingField { .. } => ErrorKind::MissingField,
            DbError::BeginFailed(_) => ErrorKind::BeginFailed,
            DbError::CommitFailed(_) => ErrorKind::CommitFailed,
            DbError::RollbackFailed { .. } => ErrorKind::RollbackFailed,
            DbError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            DbError::ConnectionFailed(_) | DbError::Backend(_) => ErrorKind::Backend,
            DbError::FunctionFailed(inner) => inner.kind(),
            DbError::Context { source, .. } => source.kind(),
        }
    }

    /// Kind of the error that started the failure, looking through
    /// `RollbackFailed` to the original cause.
    pub fn root_kind(&self) -> ErrorKind {
        match self {
            DbError::FunctionFailed(inner) => inner.root_kind(),
            DbError::Context { source, .. } => source.root_kind(),
            DbError::RollbackFailed { original, .. } => original.root_kind(),
            other => other.kind(),
        }
    }

    /// True if this error or any error it wraps has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        if self.kind() == kind {
            return true;
        }
        match self {
            DbError::FunctionFailed(inner) => inner.is(kind),
            DbError::Context { source, .. } => source.is(kind),
            DbError::RollbackFailed { original, .. } => original.is(kind),
            _ => false,
        }
    }

    /// The first `RollbackFailed` in the chain, if any.
    fn rollback_failure(&self) -> Option<(&sqlx::Error, &DbError)> {
        match self {
            DbError::RollbackFailed { rollback, original } => Some((rollback, original)),
            DbError::FunctionFailed(inner) => inner.rollback_failure(),
            DbError::Context { source, .. } => source.rollback_failure(),
            _ => None,
        }
    }

    /// The error that triggered a failed rollback, if a rollback failed.
    pub fn original(&self) -> Option<&DbError> {
        self.rollback_failure().map(|(_, original)| original)
    }

    /// Why the rollback failed, if a rollback failed.
    pub fn rollback_error(&self) -> Option<&sqlx::Error> {
        self.rollback_failure().map(|(rollback, _)| rollback)
    }
}

/// Maps a backend error raised by one statement into the taxonomy.
///
/// ## Error Mapping
/// ```text
/// unique violation  (PG 23505, SQLite 2067/1555) → DbError::DuplicateKey
/// not-null violation (PG 23502, SQLite 1299)     → DbError::MissingField
/// sqlx::Error::RowNotFound                       → DbError::NotFound
/// sqlx::Error::PoolTimedOut                      → DbError::DeadlineExceeded
/// Other                                          → DbError::Backend
/// ```
///
/// sqlx normalizes vendor codes into `sqlx::error::ErrorKind`, so this is
/// the one function that needs to know about them.
pub(crate) fn translate(err: sqlx::Error, entity: &'static str, id: &str) -> DbError {
    let kind = match &err {
        sqlx::Error::Database(db_err) => Some(db_err.kind()),
        _ => None,
    };

    match kind {
        Some(sqlx::error::ErrorKind::UniqueViolation) => DbError::DuplicateKey {
            entity,
            id: id.to_string(),
            source: err,
        },
        Some(sqlx::error::ErrorKind::NotNullViolation) => DbError::MissingField {
            entity,
            source: err,
        },
        _ => match err {
            sqlx::Error::RowNotFound => DbError::not_found(entity, id),
            other => backend(other),
        },
    }
}

/// Maps a failure of a statement that has no key to report (`list`).
pub(crate) fn backend(err: sqlx::Error) -> DbError {
    match err {
        sqlx::Error::PoolTimedOut => DbError::DeadlineExceeded,
        other => DbError::Backend(other),
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Adds operation context to a `DbResult` without losing the cause.
pub trait ResultExt<T> {
    /// Wraps the error, if any, in [`DbError::Context`].
    fn context(self, context: &'static str) -> DbResult<T>;
}

impl<T> ResultExt<T> for DbResult<T> {
    fn context(self, context: &'static str) -> DbResult<T> {
        self.map_err(|err| err.context(context))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # bazaar-db: Data-Access Layer for Bazaar
//!
//! Pooled, transactional, deadline-bounded persistence for the marketplace
//! entities (items, users, sellers, orders).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Data Flow                                 │
//! │                                                                         │
//! │  RPC handler (CreateOrder, GetItem, ...)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐       │   │
//! │  │   │ Repositories │──►│    Store     │──►│   Database   │       │   │
//! │  │   │ (repository) │   │  (store.rs)  │   │  (pool.rs)   │       │   │
//! │  │   │              │   │              │   │              │       │   │
//! │  │   │ ItemRepo     │   │ with_tx      │   │ AnyPool      │       │   │
//! │  │   │ OrderRepo    │   │ without_tx   │   │ ping/close   │       │   │
//! │  │   │ ...          │   │ deadlines    │   │              │       │   │
//! │  │   └──────┬───────┘   └──────────────┘   └──────────────┘       │   │
//! │  │          │ one statement per call                               │   │
//! │  │          ▼                                                      │   │
//! │  │   ┌──────────────┐                                              │   │
//! │  │   │   Queries    │ ← error translation                          │   │
//! │  │   │  (query/)    │                                              │   │
//! │  │   └──────────────┘                                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Postgres (production) / SQLite (tests)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Connection settings from the environment
//! - [`pool`] - Pool creation, health checks, repository access
//! - [`store`] - Units of work with and without a transaction
//! - [`query`] - One statement per operation, per entity
//! - [`repository`] - Entity CRUD built on the store and queries
//! - [`error`] - Error taxonomy and backend error translation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig, Repository};
//!
//! let db = Database::connect(&DbConfig::from_env()?).await?;
//!
//! db.items().create(&Item::new("i1", "Lamp", "Brass desk lamp")).await?;
//! let lamp = db.items().get("i1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod pool;
pub mod query;
pub mod repository;
pub mod status;
pub mod store;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use error::{DbError, DbResult, ErrorKind, ResultExt};
pub use pool::Database;
pub use repository::Repository;
pub use store::{Store, TxFuture};

// Repository re-exports for convenience
pub use repository::item::ItemRepository;
pub use repository::order::OrderRepository;
pub use repository::seller::SellerRepository;
pub use repository::user::UserRepository;

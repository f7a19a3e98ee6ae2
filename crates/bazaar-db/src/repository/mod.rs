//! # Repository Module
//!
//! Entity-level CRUD, one repository per entity.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Call, One Unit of Work                           │
//! │                                                                         │
//! │  RPC handler                                                           │
//! │       │                                                                 │
//! │       │  db.orders().create(&order)                                    │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── writes → Store::with_tx    (one transaction)                      │
//! │  └── reads  → Store::without_tx (pooled connection)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderQuery (one statement per call)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Postgres / SQLite                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories hold nothing but a [`Store`](crate::Store): no caching and no
//! retries. Errors come back wrapped with the failed operation
//! (`"failed to create item"`) and, for writes, with `"transaction failed"`.
//!
//! ## Available Repositories
//!
//! - [`ItemRepository`]
//! - [`UserRepository`]
//! - [`SellerRepository`]
//! - [`OrderRepository`] - also maintains the order's item links

use async_trait::async_trait;

use crate::error::DbResult;

pub mod item;
pub mod order;
pub mod seller;
pub mod user;

pub use item::ItemRepository;
pub use order::OrderRepository;
pub use seller::SellerRepository;
pub use user::UserRepository;

/// CRUD over one entity type.
///
/// ## Usage
/// ```rust,ignore
/// use bazaar_db::Repository;
///
/// let created = db.items().create(&Item::new("i1", "Lamp", "Brass desk lamp")).await?;
/// let fetched = db.items().get("i1").await?;
/// db.items().delete("i1").await?;
/// ```
#[async_trait]
pub trait Repository: Send + Sync {
    /// The entity this repository stores.
    type Entity: Send + Sync;

    /// Inserts the entity and returns the stored row.
    async fn create(&self, entity: &Self::Entity) -> DbResult<Self::Entity>;

    /// Reads one entity by ID.
    async fn get(&self, id: &str) -> DbResult<Self::Entity>;

    /// Reads every entity, ordered by ID.
    async fn list(&self) -> DbResult<Vec<Self::Entity>>;

    /// Replaces the entity's fields, keyed by its ID.
    async fn update(&self, entity: &Self::Entity) -> DbResult<Self::Entity>;

    /// Deletes by ID. Deleting a missing ID succeeds.
    async fn delete(&self, id: &str) -> DbResult<()>;
}

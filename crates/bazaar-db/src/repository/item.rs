//! # Item Repository
//!
//! Catalogue items: create, read, update and delete.

use async_trait::async_trait;
use bazaar_core::Item;
use tokio::time::Instant;

use crate::error::{DbResult, ResultExt};
use crate::query::ItemQuery;
use crate::repository::Repository;
use crate::store::Store;

/// Repository for items.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.items();
///
/// repo.create(&Item::new("i1", "Lamp", "Brass desk lamp")).await?;
/// let lamp = repo.get("i1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    store: Store,
}

impl ItemRepository {
    /// Creates a new item repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Returns a copy whose calls also end no later than `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self {
            store: self.store.with_deadline(deadline),
        }
    }
}

#[async_trait]
impl Repository for ItemRepository {
    type Entity = Item;

    async fn create(&self, item: &Item) -> DbResult<Item> {
        let item = item.clone();
        self.store
            .with_tx(move |conn| {
                Box::pin(async move {
                    ItemQuery
                        .create(conn, &item)
                        .await
                        .context("failed to create item")
                })
            })
            .await
            .context("transaction failed")
    }

    async fn get(&self, id: &str) -> DbResult<Item> {
        let id = id.to_string();
        self.store
            .without_tx(|pool| async move {
                ItemQuery.get(&pool, &id).await.context("failed to get item")
            })
            .await
    }

    async fn list(&self) -> DbResult<Vec<Item>> {
        self.store
            .without_tx(|pool| async move {
                ItemQuery.list(&pool).await.context("failed to list items")
            })
            .await
    }

    async fn update(&self, item: &Item) -> DbResult<Item> {
        let item = item.clone();
        self.store
            .with_tx(move |conn| {
                Box::pin(async move {
                    ItemQuery
                        .update(conn, &item)
                        .await
                        .context("failed to update item")
                })
            })
            .await
            .context("transaction failed")
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let id = id.to_string();
        self.store
            .with_tx(move |conn| {
                Box::pin(async move {
                    ItemQuery
                        .delete(conn, &id)
                        .await
                        .context("failed to delete item")
                })
            })
            .await
            .context("transaction failed")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

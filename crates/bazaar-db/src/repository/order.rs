//! # Order Repository
//!
//! Orders and the items they reference.
//!
//! ## Order Write Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Create (one transaction)                       │
//! │                                                                         │
//! │  1. INSERT INTO orders (id, user_id)                                   │
//! │  2. INSERT INTO order_items (order_id, item_id, position) × N          │
//! │                                                                         │
//! │  Any failure (for example the same item twice) → ROLLBACK              │
//! │  → no order row, no links                                              │
//! │                                                                         │
//! │  Update: UPDATE orders → DELETE links → INSERT links × N              │
//! │  Delete: DELETE links → DELETE orders                                  │
//! │  Get/List: one SELECT joining orders and order_items                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use bazaar_core::Order;
use sqlx::AnyConnection;
use tokio::time::Instant;

use crate::error::{DbResult, ResultExt};
use crate::query::OrderQuery;
use crate::repository::Repository;
use crate::store::Store;

/// Repository for orders.
///
/// ## Usage
/// ```rust,ignore
/// let order = Order::new("o1", "u1", ["i1", "i2"]);
/// db.orders().create(&order).await?;
///
/// let fetched = db.orders().get("o1").await?;
/// assert_eq!(fetched.items, vec!["i1", "i2"]);
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    store: Store,
}

impl OrderRepository {
    /// Creates a new order repository.
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

/// Inserts one link per item, keeping the sequence order.
async fn link_items(conn: &mut AnyConnection, order: &Order) -> DbResult<()> {
    for (position, item_id) in order.items.iter().enumerate() {
        OrderQuery
            .add_item(&mut *conn, &order.id, item_id, position as i32)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl Repository for OrderRepository {
    type Entity = Order;

    async fn create(&self, order: &Order) -> DbResult<Order> {
        let order = order.clone();
        self.store
            .with_tx(move |conn| {
                Box::pin(async move {
                    let mut created = OrderQuery
                        .create(&mut *conn, &order)
                        .await
                        .context("failed to create order")?;
                    link_items(conn, &order)
                        .await
                        .context("failed to create order")?;

                    created.items = order.items;
                    Ok(created)
                })
            })
            .await
            .context("transaction failed")
    }

    async fn get(&self, id: &str) -> DbResult<Order> {
        let id = id.to_string();
        self.store
            .without_tx(|pool| async move {
                OrderQuery.get(&pool, &id).await.context("failed to get order")
            })
            .await
    }

    async fn list(&self) -> DbResult<Vec<Order>> {
        self.store
            .without_tx(|pool| async move {
                OrderQuery.list(&pool).await.context("failed to list orders")
            })
            .await
    }

    async fn update(&self, order: &Order) -> DbResult<Order> {
        let order = order.clone();
        self.store
            .with_tx(move |conn| {
                Box::pin(async move {
                    let mut updated = OrderQuery
                        .update(&mut *conn, &order)
                        .await
                        .context("failed to update order")?;
                    OrderQuery
                        .clear_items(&mut *conn, &order.id)
                        .await
                        .context("failed to update order")?;
                    link_items(conn, &order)
                        .await
                        .context("failed to update order")?;

                    updated.items = order.items;
                    Ok(updated)
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
                    OrderQuery
                        .clear_items(&mut *conn, &id)
                        .await
                        .context("failed to delete order")?;
                    OrderQuery
                        .delete(conn, &id)
                        .await
                        .context("failed to delete order")
                })
            })
            .await
            .context("transaction failed")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{setup, setup_file};
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_order_keeps_item_sequence() {
        let db = setup().await;
        let orders = db.orders();
        let order = Order::new("o1", "u1", ["i3", "i1", "i2"]);

        let created = orders.create(&order).await.unwrap();
        assert_eq!(created, order);

        let fetched = orders.get("o1").await.unwrap();
        assert_eq!(fetched.items, vec!["i3", "i1", "i2"]);
    }

    #[tokio::test]
    async fn test_failed_link_rolls_back_order_row() {
        let db = setup().await;
        let orders = db.orders();

        let err = orders
            .create(&Order::new("o1", "u1", ["i1", "i1"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert!(err.to_string().contains("order item with ID o1/i1 already exists"));
        assert_eq!(orders.get("o1").await.unwrap_err().kind(), ErrorKind::NotFound);
        assert!(orders.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_item_reference_is_invalid() {
        let db = setup().await;

        let err = db
            .orders()
            .create(&Order::new("o1", "u1", ["i1", " "]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_update_replaces_items() {
        let db = setup().await;
        let orders = db.orders();
        orders
            .create(&Order::new("o1", "u1", ["i1", "i2"]))
            .await
            .unwrap();

        let updated = orders
            .update(&Order::new("o1", "u2", ["i2", "i4"]))
            .await
            .unwrap();
        assert_eq!(updated.user_id, "u2");

        let fetched = orders.get("o1").await.unwrap();
        assert_eq!(fetched, Order::new("o1", "u2", ["i2", "i4"]));
    }

    #[tokio::test]
    async fn test_failed_update_keeps_previous_items() {
        let db = setup().await;
        let orders = db.orders();
        let original = Order::new("o1", "u1", ["i1", "i2"]);
        orders.create(&original).await.unwrap();

        let err = orders
            .update(&Order::new("o1", "u2", ["i5", "i5"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert_eq!(orders.get("o1").await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_list_groups_items_by_order() {
        let db = setup().await;
        let orders = db.orders();
        orders
            .create(&Order::new("o2", "u1", ["i9"]))
            .await
            .unwrap();
        orders
            .create(&Order::new("o1", "u1", ["i2", "i1"]))
            .await
            .unwrap();
        orders
            .create(&Order::new("o3", "u2", Vec::<String>::new()))
            .await
            .unwrap();

        let listed = orders.list().await.unwrap();

        assert_eq!(
            listed,
            vec![
                Order::new("o1", "u1", ["i2", "i1"]),
                Order::new("o2", "u1", ["i9"]),
                Order::new("o3", "u2", Vec::<String>::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_removes_links() {
        let db = setup().await;
        let orders = db.orders();
        orders
            .create(&Order::new("o1", "u1", ["i1"]))
            .await
            .unwrap();

        orders.delete("o1").await.unwrap();
        orders.delete("o1").await.unwrap();

        assert_eq!(orders.get("o1").await.unwrap_err().kind(), ErrorKind::NotFound);

        // the same item can be linked again under a fresh order with the same id
        orders
            .create(&Order::new("o1", "u1", ["i1"]))
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_never_mix_two_committed_versions() {
        let (db, _file) = setup_file(4).await;
        let first = Order::new("o1", "uA", ["a1", "a2"]);
        let second = Order::new("o1", "uB", ["b1", "b2"]);
        db.orders().create(&first).await.unwrap();

        let writer = {
            let orders = db.orders();
            let (first, second) = (first.clone(), second.clone());
            tokio::spawn(async move {
                for n in 0..60 {
                    let next = if n % 2 == 0 { &second } else { &first };
                    orders.update(next).await.unwrap();
                }
            })
        };

        let orders = db.orders();
        loop {
            let seen = orders.get("o1").await.unwrap();
            assert!(seen == first || seen == second, "mixed read: {seen:?}");

            let listed = orders.list().await.unwrap();
            assert_eq!(listed.len(), 1);
            assert!(listed[0] == first || listed[0] == second, "mixed list: {listed:?}");

            if writer.is_finished() {
                break;
            }
        }
        writer.await.unwrap();
    }
}

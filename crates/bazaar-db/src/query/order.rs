//! # Order Queries
//!
//! Statements for `orders` and its `order_items` link table.
//!
//! An order row holds only `id` and `user_id`. The item references live in
//! `order_items`, one row per item, with `position` keeping the caller's
//! sequence. Writing a full [`Order`] takes more than one statement, so the
//! repository runs the writes together in one unit of work. Reads join the
//! two tables in a single statement.

use bazaar_core::validation::{validate_key, Validate};
use bazaar_core::Order;
use sqlx::{AnyConnection, AnyPool};
use tracing::debug;

use crate::error::{backend, translate, DbError, DbResult};

const ENTITY: &str = "order";
const LINK_ENTITY: &str = "order item";

/// Statements for orders and their item links.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderQuery;

impl OrderQuery {
    /// Inserts the order row. Links are added separately with
    /// [`add_item`](Self::add_item); the returned order has no items.
    pub async fn create(&self, conn: &mut AnyConnection, order: &Order) -> DbResult<Order> {
        order.validate()?;
        debug!(id = %order.id, user_id = %order.user_id, "Inserting order");

        sqlx::query_as::<_, Order>(
            "INSERT INTO orders (id, user_id) VALUES ($1, $2) RETURNING id, user_id",
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| translate(e, ENTITY, &order.id))
    }

    /// Gets an order with its items, in position order.
    ///
    /// Row and links come from one statement, so the result never mixes
    /// two committed versions of the order.
    pub async fn get(&self, pool: &AnyPool, id: &str) -> DbResult<Order> {
        validate_key("id", id)?;

        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.id, o.user_id, oi.item_id
            FROM orders o
            LEFT JOIN order_items oi ON oi.order_id = o.id
            WHERE o.id = $1
            ORDER BY oi.position
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await
        .map_err(|e| translate(e, ENTITY, id))?;

        fold_orders(rows)
            .pop()
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Lists every order with its items, ordered by ID.
    pub async fn list(&self, pool: &AnyPool) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.id, o.user_id, oi.item_id
            FROM orders o
            LEFT JOIN order_items oi ON oi.order_id = o.id
            ORDER BY o.id, oi.position
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(backend)?;

        let orders = fold_orders(rows);
        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Updates the owning user, keyed by ID.
    pub async fn update(&self, conn: &mut AnyConnection, order: &Order) -> DbResult<Order> {
        order.validate()?;
        debug!(id = %order.id, "Updating order");

        sqlx::query_as::<_, Order>(
            "UPDATE orders SET user_id = $1 WHERE id = $2 RETURNING id, user_id",
        )
        .bind(&order.user_id)
        .bind(&order.id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| translate(e, ENTITY, &order.id))?
        .ok_or_else(|| DbError::not_found(ENTITY, &order.id))
    }

    /// Deletes the order row. Deleting a missing ID succeeds.
    pub async fn delete(&self, conn: &mut AnyConnection, id: &str) -> DbResult<()> {
        validate_key("id", id)?;
        debug!(id = %id, "Deleting order");

        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| translate(e, ENTITY, id))?;

        Ok(())
    }

    /// Links one item to an order at `position`.
    ///
    /// Linking the same item twice is a `DuplicateKey` on the link.
    pub async fn add_item(
        &self,
        conn: &mut AnyConnection,
        order_id: &str,
        item_id: &str,
        position: i32,
    ) -> DbResult<()> {
        validate_key("order_id", order_id)?;
        validate_key("item_id", item_id)?;
        debug!(order_id = %order_id, item_id = %item_id, position, "Linking item to order");

        sqlx::query("INSERT INTO order_items (order_id, item_id, position) VALUES ($1, $2, $3)")
            .bind(order_id)
            .bind(item_id)
            .bind(position)
            .execute(&mut *conn)
            .await
            .map_err(|e| translate(e, LINK_ENTITY, &format!("{order_id}/{item_id}")))?;

        Ok(())
    }

    /// Removes every item link of an order.
    pub async fn clear_items(&self, conn: &mut AnyConnection, order_id: &str) -> DbResult<()> {
        validate_key("order_id", order_id)?;
        debug!(order_id = %order_id, "Clearing order items");

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| translate(e, LINK_ENTITY, order_id))?;

        Ok(())
    }
}

/// One joined row: the order columns plus one linked item, if any.
type OrderRow = (String, String, Option<String>);

/// Folds joined rows, sorted by order id, into orders.
fn fold_orders(rows: Vec<OrderRow>) -> Vec<Order> {
    let mut orders: Vec<Order> = Vec::new();

    for (id, user_id, item_id) in rows {
        let same_order = orders.last().is_some_and(|order| order.id == id);
        if !same_order {
            orders.push(Order::new(id, user_id, Vec::<String>::new()));
        }
        if let (Some(order), Some(item_id)) = (orders.last_mut(), item_id) {
            order.items.push(item_id);
        }
    }

    orders
}

//! # Item Queries
//!
//! Statements for the `items` table.

use bazaar_core::validation::{validate_key, Validate};
use bazaar_core::Item;
use sqlx::{AnyConnection, AnyPool};
use tracing::debug;

use crate::error::{backend, translate, DbError, DbResult};

const ENTITY: &str = "item";

/// Statements for items.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemQuery;

impl ItemQuery {
    /// Inserts an item and returns the stored row.
    pub async fn create(&self, conn: &mut AnyConnection, item: &Item) -> DbResult<Item> {
        item.validate()?;
        debug!(id = %item.id, "Inserting item");

        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| translate(e, ENTITY, &item.id))
    }

    /// Gets an item by its ID.
    pub async fn get(&self, pool: &AnyPool, id: &str) -> DbResult<Item> {
        validate_key("id", id)?;

        sqlx::query_as::<_, Item>("SELECT id, name, description FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| translate(e, ENTITY, id))?
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Lists every item, ordered by ID.
    pub async fn list(&self, pool: &AnyPool) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, description FROM items ORDER BY id",
        )
        .fetch_all(pool)
        .await
        .map_err(backend)?;

        debug!(count = items.len(), "Listed items");
        Ok(items)
    }

    /// Updates name and description, keyed by ID.
    pub async fn update(&self, conn: &mut AnyConnection, item: &Item) -> DbResult<Item> {
        validate_key("id", &item.id)?;
        debug!(id = %item.id, "Updating item");

        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET
                name = $1,
                description = $2
            WHERE id = $3
            RETURNING id, name, description
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| translate(e, ENTITY, &item.id))?
        .ok_or_else(|| DbError::not_found(ENTITY, &item.id))
    }

    /// Deletes an item. Deleting a missing ID succeeds.
    pub async fn delete(&self, conn: &mut AnyConnection, id: &str) -> DbResult<()> {
        validate_key("id", id)?;
        debug!(id = %id, "Deleting item");

        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| translate(e, ENTITY, id))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_not_null_violation_is_missing_field() {
        let db = setup().await;

        let err = sqlx::query("INSERT INTO items (id, name, description) VALUES ($1, NULL, $2)")
            .bind("i1")
            .bind("no name")
            .execute(db.pool())
            .await
            .map_err(|e| translate(e, ENTITY, "i1"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingField);
    }

    #[tokio::test]
    async fn test_write_inside_caller_transaction() {
        let db = setup().await;
        let mut tx = db.pool().begin().await.unwrap();

        ItemQuery
            .create(&mut *tx, &Item::new("i1", "Lamp", "Brass desk lamp"))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let err = ItemQuery.get(db.pool(), "i1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

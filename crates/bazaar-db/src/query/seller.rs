//! Statements for the `sellers` table.

use bazaar_core::validation::{validate_key, Validate};
use bazaar_core::Seller;
use sqlx::{AnyConnection, AnyPool};
use tracing::debug;

use crate::error::{backend, translate, DbError, DbResult};

const ENTITY: &str = "seller";

/// Statements for sellers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SellerQuery;

impl SellerQuery {
    pub async fn create(&self, conn: &mut AnyConnection, seller: &Seller) -> DbResult<Seller> {
        seller.validate()?;
        debug!(id = %seller.id, "Inserting seller");

        sqlx::query_as::<_, Seller>(
            "INSERT INTO sellers (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(&seller.id)
        .bind(&seller.name)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| translate(e, ENTITY, &seller.id))
    }

    pub async fn get(&self, pool: &AnyPool, id: &str) -> DbResult<Seller> {
        validate_key("id", id)?;

        sqlx::query_as::<_, Seller>("SELECT id, name FROM sellers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| translate(e, ENTITY, id))?
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    pub async fn list(&self, pool: &AnyPool) -> DbResult<Vec<Seller>> {
        let sellers = sqlx::query_as::<_, Seller>("SELECT id, name FROM sellers ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(backend)?;

        debug!(count = sellers.len(), "Listed sellers");
        Ok(sellers)
    }

    pub async fn update(&self, conn: &mut AnyConnection, seller: &Seller) -> DbResult<Seller> {
        validate_key("id", &seller.id)?;
        debug!(id = %seller.id, "Updating seller");

        sqlx::query_as::<_, Seller>(
            "UPDATE sellers SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&seller.name)
        .bind(&seller.id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| translate(e, ENTITY, &seller.id))?
        .ok_or_else(|| DbError::not_found(ENTITY, &seller.id))
    }

    /// Deleting a missing ID succeeds.
    pub async fn delete(&self, conn: &mut AnyConnection, id: &str) -> DbResult<()> {
        validate_key("id", id)?;
        debug!(id = %id, "Deleting seller");

        sqlx::query("DELETE FROM sellers WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| translate(e, ENTITY, id))?;

        Ok(())
    }
}

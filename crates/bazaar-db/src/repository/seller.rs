//! Seller repository.

use async_trait::async_trait;
use bazaar_core::Seller;
use tokio::time::Instant;

use crate::error::{DbResult, ResultExt};
use crate::query::SellerQuery;
use crate::repository::Repository;
use crate::store::Store;

/// Repository for sellers.
#[derive(Debug, Clone)]
pub struct SellerRepository {
    store: Store,
}

impl SellerRepository {
    /// Creates a new seller repository.
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
impl Repository for SellerRepository {
    type Entity = Seller;

    async fn create(&self, seller: &Seller) -> DbResult<Seller> {
        let seller = seller.clone();
        self.store
            .with_tx(move |conn| {
                Box::pin(async move {
                    SellerQuery
                        .create(conn, &seller)
                        .await
                        .context("failed to create seller")
                })
            })
            .await
            .context("transaction failed")
    }

    async fn get(&self, id: &str) -> DbResult<Seller> {
        let id = id.to_string();
        self.store
            .without_tx(|pool| async move {
                SellerQuery.get(&pool, &id).await.context("failed to get seller")
            })
            .await
    }

    async fn list(&self) -> DbResult<Vec<Seller>> {
        self.store
            .without_tx(|pool| async move {
                SellerQuery.list(&pool).await.context("failed to list sellers")
            })
            .await
    }

    async fn update(&self, seller: &Seller) -> DbResult<Seller> {
        let seller = seller.clone();
        self.store
            .with_tx(move |conn| {
                Box::pin(async move {
                    SellerQuery
                        .update(conn, &seller)
                        .await
                        .context("failed to update seller")
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
                    SellerQuery
                        .delete(conn, &id)
                        .await
                        .context("failed to delete seller")
                })
            })
            .await
            .context("transaction failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_seller_crud() {
        let db = setup().await;
        let sellers = db.sellers();

        sellers.create(&Seller::new("s1", "Acme")).await.unwrap();
        let renamed = sellers.update(&Seller::new("s1", "Acme Ltd")).await.unwrap();
        assert_eq!(renamed.name, "Acme Ltd");
        assert_eq!(sellers.list().await.unwrap(), vec![renamed]);

        sellers.delete("s1").await.unwrap();
        sellers.delete("s1").await.unwrap();
        assert_eq!(sellers.get("s1").await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_missing_seller() {
        let db = setup().await;

        let err = db
            .sellers()
            .update(&Seller::new("s9", "Nobody"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "transaction failed: transaction function failed: failed to update seller: seller with ID s9 not found"
        );
    }
}

//! # User Repository
//!
//! Marketplace users. The stored password is returned as is and never logged.

use async_trait::async_trait;
use bazaar_core::User;
use tokio::time::Instant;

use crate::error::{DbResult, ResultExt};
use crate::query::UserQuery;
use crate::repository::Repository;
use crate::store::Store;

/// Repository for users.
#[derive(Debug, Clone)]
pub struct UserRepository {
    store: Store,
}

impl UserRepository {
    /// Creates a new user repository.
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
impl Repository for UserRepository {
    type Entity = User;

    async fn create(&self, user: &User) -> DbResult<User> {
        let user = user.clone();
        self.store
            .with_tx(move |conn| {
                Box::pin(async move {
                    UserQuery
                        .create(conn, &user)
                        .await
                        .context("failed to create user")
                })
            })
            .await
            .context("transaction failed")
    }

    async fn get(&self, id: &str) -> DbResult<User> {
        let id = id.to_string();
        self.store
            .without_tx(|pool| async move {
                UserQuery.get(&pool, &id).await.context("failed to get user")
            })
            .await
    }

    async fn list(&self) -> DbResult<Vec<User>> {
        self.store
            .without_tx(|pool| async move {
                UserQuery.list(&pool).await.context("failed to list users")
            })
            .await
    }

    async fn update(&self, user: &User) -> DbResult<User> {
        let user = user.clone();
        self.store
            .with_tx(move |conn| {
                Box::pin(async move {
                    UserQuery
                        .update(conn, &user)
                        .await
                        .context("failed to update user")
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
                    UserQuery
                        .delete(conn, &id)
                        .await
                        .context("failed to delete user")
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
    use crate::test_support::setup;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_user_round_trip() {
        let db = setup().await;
        let users = db.users();
        let alice = User::new("u1", "Alice", "hunter2");

        assert_eq!(users.create(&alice).await.unwrap(), alice);
        assert_eq!(users.get("u1").await.unwrap(), alice);
    }

    #[tokio::test]
    async fn test_update_returns_stored_password() {
        let db = setup().await;
        let users = db.users();
        users
            .create(&User::new("u1", "Alice", "hunter2"))
            .await
            .unwrap();

        let updated = users
            .update(&User::new("u1", "Alice B.", "correct horse"))
            .await
            .unwrap();

        assert_eq!(updated.name, "Alice B.");
        assert_eq!(updated.password, "correct horse");
        assert_eq!(users.get("u1").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_duplicate_user() {
        let db = setup().await;
        let users = db.users();
        let alice = User::new("u1", "Alice", "hunter2");
        users.create(&alice).await.unwrap();

        let err = users.create(&alice).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert!(!err.to_string().contains("hunter2"));
    }

    #[tokio::test]
    async fn test_list_and_delete_users() {
        let db = setup().await;
        let users = db.users();
        users.create(&User::new("u2", "Bob", "pw")).await.unwrap();
        users.create(&User::new("u1", "Alice", "pw")).await.unwrap();

        let names: Vec<String> = users.list().await.unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);

        users.delete("u1").await.unwrap();
        assert_eq!(users.list().await.unwrap().len(), 1);
        assert_eq!(users.get("u1").await.unwrap_err().kind(), ErrorKind::NotFound);
    }
}

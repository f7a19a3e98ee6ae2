//! # User Queries
//!
//! Statements for the `users` table. The password column is read and
//! written like any other, but never logged.

use bazaar_core::validation::{validate_key, Validate};
use bazaar_core::User;
use sqlx::{AnyConnection, AnyPool};
use tracing::debug;

use crate::error::{backend, translate, DbError, DbResult};

const ENTITY: &str = "user";

/// Statements for users.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserQuery;

impl UserQuery {
    /// Inserts a user and returns the stored row.
    pub async fn create(&self, conn: &mut AnyConnection, user: &User) -> DbResult<User> {
        user.validate()?;
        debug!(id = %user.id, "Inserting user");

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, password
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.password)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| translate(e, ENTITY, &user.id))
    }

    /// Gets a user by ID.
    pub async fn get(&self, pool: &AnyPool, id: &str) -> DbResult<User> {
        validate_key("id", id)?;

        sqlx::query_as::<_, User>("SELECT id, name, password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| translate(e, ENTITY, id))?
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Lists every user, ordered by ID.
    pub async fn list(&self, pool: &AnyPool) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, password FROM users ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(backend)?;

        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// Updates name and password, keyed by ID.
    ///
    /// The returned row carries the stored password, same as `get`.
    pub async fn update(&self, conn: &mut AnyConnection, user: &User) -> DbResult<User> {
        validate_key("id", &user.id)?;
        debug!(id = %user.id, "Updating user");

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = $1,
                password = $2
            WHERE id = $3
            RETURNING id, name, password
            "#,
        )
        .bind(&user.name)
        .bind(&user.password)
        .bind(&user.id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| translate(e, ENTITY, &user.id))?
        .ok_or_else(|| DbError::not_found(ENTITY, &user.id))
    }

    /// Deletes a user. Deleting a missing ID succeeds.
    pub async fn delete(&self, conn: &mut AnyConnection, id: &str) -> DbResult<()> {
        validate_key("id", id)?;
        debug!(id = %id, "Deleting user");

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| translate(e, ENTITY, id))?;

        Ok(())
    }
}

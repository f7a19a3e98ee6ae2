//! # Domain Types
//!
//! Entities stored by the Bazaar data-access layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │      User       │   │     Seller      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name           │   │  name           │   │  name           │       │
//! │  │  description    │   │  password (***) │   └─────────────────┘       │
//! │  └────────▲────────┘   └────────▲────────┘                              │
//! │           │ items[]             │ user_id                               │
//! │  ┌────────┴─────────────────────┴──┐                                   │
//! │  │             Order               │                                   │
//! │  │  id, user_id, items (ordered)   │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Item
// =============================================================================

/// A catalogue item that orders can reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Caller-assigned identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-form description.
    pub description: String,
}

impl Item {
    /// Convenience constructor.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Item {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A marketplace user.
///
/// ## Credential Handling
/// `password` is an opaque credential supplied by the caller (already hashed
/// or otherwise prepared upstream). It is stored and returned verbatim but
/// never rendered by `Debug`, so it cannot leak through `tracing` fields or
/// panic messages.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Caller-assigned identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Opaque credential.
    pub password: String,
}

impl User {
    /// Convenience constructor.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        User {
            id: id.into(),
            name: name.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("password", &"***")
            .finish()
    }
}

// =============================================================================
// Seller
// =============================================================================

/// A seller listing items on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Seller {
    /// Caller-assigned identifier.
    pub id: String,

    /// Display name.
    pub name: String,
}

impl Seller {
    /// Convenience constructor.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Seller {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order placed by a user.
///
/// `items` holds item ids in the order the caller supplied them. They are
/// persisted as separate link rows, so the `orders` row itself only carries
/// `id` and `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    /// Caller-assigned identifier.
    pub id: String,

    /// The ordering user.
    pub user_id: String,

    /// Referenced item ids, in sequence order.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<String>,
}

impl Order {
    /// Convenience constructor.
    pub fn new<I, S>(id: impl Into<String>, user_id: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Order {
            id: id.into(),
            user_id: user_id.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_debug_redacts_password() {
        let user = User::new("u1", "Ada", "hunter2");
        let rendered = format!("{:?}", user);

        assert!(rendered.contains("Ada"));
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_order_items_default_when_absent() {
        let order: Order = serde_json::from_str(r#"{"id":"o1","user_id":"u1"}"#).unwrap();
        assert_eq!(order, Order::new("o1", "u1", Vec::<String>::new()));
    }

    #[test]
    fn test_order_preserves_item_sequence() {
        let order = Order::new("o1", "u1", ["i3", "i1", "i2"]);
        assert_eq!(order.items, vec!["i3", "i1", "i2"]);
    }
}

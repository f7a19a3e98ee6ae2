//! # Validation Module
//!
//! Checks run by the query layer before a statement is sent.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: RPC handler                                                  │
//! │  └── Message-level checks (outside this workspace)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Keys present before touching the backend (→ InvalidArgument)      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  ├── NOT NULL constraints  (→ MissingField)                            │
//! │  └── UNIQUE constraints    (→ DuplicateKey)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{Item, Order, Seller, User};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates that a key or reference is present.
///
/// Whitespace-only values count as empty.
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_key;
///
/// assert!(validate_key("id", "i1").is_ok());
/// assert!(validate_key("id", "  ").is_err());
/// ```
pub fn validate_key(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Entities that can be checked before an insert or update.
pub trait Validate {
    /// Returns the first problem found, if any.
    fn validate(&self) -> ValidationResult<()>;
}

impl Validate for Item {
    fn validate(&self) -> ValidationResult<()> {
        validate_key("id", &self.id)
    }
}

impl Validate for User {
    fn validate(&self) -> ValidationResult<()> {
        validate_key("id", &self.id)
    }
}

impl Validate for Seller {
    fn validate(&self) -> ValidationResult<()> {
        validate_key("id", &self.id)
    }
}

impl Validate for Order {
    fn validate(&self) -> ValidationResult<()> {
        validate_key("id", &self.id)?;
        validate_key("user_id", &self.user_id)?;

        if let Some(index) = self.items.iter().position(|id| id.trim().is_empty()) {
            return Err(ValidationError::RequiredElement {
                field: "items".to_string(),
                index,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_entities_rejected() {
        assert!(Item::default().validate().is_err());
        assert!(User::default().validate().is_err());
        assert!(Seller::default().validate().is_err());
        assert!(Order::default().validate().is_err());
    }

    #[test]
    fn test_item_with_id_accepted() {
        // Only the key is mandatory; empty text columns are valid values.
        let item = Item::new("i1", "", "");
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_order_requires_user() {
        let order = Order::new("o1", "", ["i1"]);
        assert_eq!(
            order.validate(),
            Err(ValidationError::Required {
                field: "user_id".to_string()
            })
        );
    }

    #[test]
    fn test_order_rejects_blank_item_reference() {
        let order = Order::new("o1", "u1", ["i1", " "]);
        assert_eq!(
            order.validate(),
            Err(ValidationError::RequiredElement {
                field: "items".to_string(),
                index: 1
            })
        );
    }

    #[test]
    fn test_order_without_items_is_valid() {
        let order = Order::new("o1", "u1", Vec::<String>::new());
        assert!(order.validate().is_ok());
    }
}

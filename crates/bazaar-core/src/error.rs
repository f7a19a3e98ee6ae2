//! # Error Types
//!
//! Input validation failures for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core (this file)                                               │
//! │  └── ValidationError  - Input rejected before any backend call         │
//! │                                                                         │
//! │  bazaar-db                                                             │
//! │  └── DbError          - Taxonomy seen by RPC handlers                  │
//! │                         (ValidationError → DbError::InvalidArgument)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// An element of a sequence field is missing or empty.
    ///
    /// ## When This Occurs
    /// - `Order.items` contains an empty item id
    #[error("{field}[{index}] is required")]
    RequiredElement { field: String, index: usize },
}

//! # bazaar-core: Domain Types for Bazaar
//!
//! The entities that RPC handlers hand to the data-access layer, plus the
//! input checks every write performs before it touches the backend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Data Flow                                 │
//! │                                                                         │
//! │  RPC handler (CreateItem, GetOrder, ...)                               │
//! │       │  builds Item / User / Seller / Order                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │   types: Item, User, Seller, Order                              │   │
//! │  │   validation: required ids before any statement runs           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bazaar-db: Store / queries / repositories                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities
//! - [`validation`] - Input validation
//! - [`error`] - Validation error type
//!
//! ## Identity
//! Every entity carries an opaque, caller-assigned `id`. The data-access
//! layer never generates ids and never changes them after creation.

pub mod error;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use types::*;

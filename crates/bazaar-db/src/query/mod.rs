//! # Query Module
//!
//! One statement per operation, one struct per entity.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation │ Runs on           │ Failure mapping                        │
//! │────────────┼───────────────────┼────────────────────────────────────────│
//! │  create    │ &mut AnyConnection│ empty key → InvalidArgument            │
//! │            │ (the transaction) │ unique → DuplicateKey                  │
//! │            │                   │ not null → MissingField                │
//! │  get       │ &AnyPool          │ empty key → InvalidArgument            │
//! │            │                   │ no row → NotFound                      │
//! │  list      │ &AnyPool          │ any failure → Backend                  │
//! │  update    │ &mut AnyConnection│ no row → NotFound                      │
//! │  delete    │ &mut AnyConnection│ no row → Ok (idempotent)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes take the connection borrowed from a transaction, so a write can
//! only run inside a unit of work the caller opened. The concrete backend
//! behind `AnyConnection` is whatever the pool URL selected.
//!
//! `list` orders rows by `id`; ordering by anything else is not offered.

pub mod item;
pub mod order;
pub mod seller;
pub mod user;

pub use item::ItemQuery;
pub use order::OrderQuery;
pub use seller::SellerQuery;
pub use user::UserQuery;

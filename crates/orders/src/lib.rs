//! Service layer for the bookstore backend.
//!
//! The central piece is the order placement workflow: one transaction
//! that resolves the user, resolves each requested book, checks and
//! decrements stock through the ledger, computes the total, and
//! persists the order graph. Any failure before commit leaves the
//! store untouched.
//!
//! Catalog and identity services cover the surrounding bookkeeping:
//! registering books with their inventory row, restocking, and user
//! registration.

pub mod catalog;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod placement;

pub use catalog::{CatalogEntry, CatalogService, NewBook};
pub use error::{OrdersError, Result};
pub use identity::IdentityService;
pub use placement::{OrderLine, OrderService, PlaceOrder};

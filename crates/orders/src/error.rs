//! Service-level error taxonomy.

use common::{BookId, OrderId, UserId};
use domain::OrderError;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by the order, catalog, and identity services.
///
/// Every variant is a recoverable caller condition; the HTTP layer
/// maps them onto status codes. Any error raised mid-placement aborts
/// the whole transaction before it is surfaced.
#[derive(Debug, Error)]
pub enum OrdersError {
    /// No user exists with the given identifier.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// No book exists with the given identifier.
    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    /// The book exists but owns no inventory row.
    #[error("No inventory for book: {0}")]
    InventoryNotFound(BookId),

    /// Remaining stock is lower than the requested quantity.
    #[error(
        "Insufficient stock for \"{title}\": requested {requested}, available {available}"
    )]
    InsufficientStock {
        title: String,
        requested: u32,
        available: u32,
    },

    /// No order exists with the given identifier.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A book with this ISBN or title is already registered.
    #[error("Book already in catalog: {0}")]
    DuplicateBook(String),

    /// The username is already taken.
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    /// Order validation failed (empty order, bad quantity, unknown status).
    #[error(transparent)]
    Domain(#[from] OrderError),

    /// The store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, OrdersError>;

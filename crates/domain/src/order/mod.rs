//! The order aggregate: line items, builder, and status machine.

mod aggregate;
mod status;

pub use aggregate::{LineItem, Order, OrderBuilder};
pub use status::OrderStatus;

use thiserror::Error;

/// Validation errors raised while constructing an order or parsing a
/// status transition target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// An order must contain at least one line item.
    #[error("Order must contain at least one line item")]
    NoLineItems,

    /// Line item quantities must be at least one.
    #[error("Invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// The requested status is not a recognized lifecycle state.
    #[error("Unknown order status: {0}")]
    InvalidStatus(String),
}

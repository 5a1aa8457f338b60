//! Order aggregate and its builder.

use chrono::{DateTime, Utc};
use common::{BookId, OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::money::Money;

use super::{OrderError, OrderStatus};

/// One (book, quantity) pairing within an order.
///
/// Carries the book identifier plus the title and unit price captured
/// at placement time, not a live reference into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The ordered book.
    pub book_id: BookId,

    /// Title at placement time.
    pub title: String,

    /// Copies ordered. Always at least one.
    pub quantity: u32,

    /// Unit price at placement time, in minor units.
    pub unit_price: Money,
}

impl LineItem {
    /// Returns the total price for this line (unit price × quantity).
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A placed order together with the line items it owns.
///
/// Total amount and line items are immutable after construction; only
/// the status changes post-creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    placed_at: DateTime<Utc>,
    status: OrderStatus,
    line_items: Vec<LineItem>,
    total: Money,
}

impl Order {
    /// Returns the order identifier.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the identifier of the user who placed the order.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the placement timestamp.
    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// Returns the current lifecycle status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the owned line items, in placement order.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Returns the derived total amount.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Overwrites the lifecycle status.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    /// Reassembles an order from its persisted parts.
    ///
    /// Used by the store layer when loading rows; the builder is the
    /// only path for creating new orders.
    pub fn from_parts(
        id: OrderId,
        user_id: UserId,
        placed_at: DateTime<Utc>,
        status: OrderStatus,
        line_items: Vec<LineItem>,
        total: Money,
    ) -> Self {
        Self {
            id,
            user_id,
            placed_at,
            status,
            line_items,
            total,
        }
    }
}

/// Assembles the order graph one validated line at a time.
///
/// The running total is accumulated in minor units as lines are added,
/// so the built order always satisfies
/// `total == Σ(unit_price × quantity)` exactly.
#[derive(Debug)]
pub struct OrderBuilder {
    user_id: UserId,
    line_items: Vec<LineItem>,
    total: Money,
}

impl OrderBuilder {
    /// Starts a new order for the given (already resolved) user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            line_items: Vec::new(),
            total: Money::zero(),
        }
    }

    /// Adds a line for `quantity` copies of `book`.
    ///
    /// Rejects non-positive quantities; the caller has already resolved
    /// the book, so the line captures its title and current price.
    pub fn add_line(&mut self, book: &Book, quantity: u32) -> Result<(), OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity });
        }

        let line = LineItem {
            book_id: book.id,
            title: book.title.clone(),
            quantity,
            unit_price: book.price,
        };
        self.total += line.subtotal();
        self.line_items.push(line);
        Ok(())
    }

    /// Returns the running total of all lines added so far.
    pub fn running_total(&self) -> Money {
        self.total
    }

    /// Returns the number of lines added so far.
    pub fn line_count(&self) -> usize {
        self.line_items.len()
    }

    /// Finishes the order with a fresh identifier and Pending status.
    ///
    /// Fails when no line was added; every order owns at least one
    /// line item.
    pub fn build(self, placed_at: DateTime<Utc>) -> Result<Order, OrderError> {
        if self.line_items.is_empty() {
            return Err(OrderError::NoLineItems);
        }

        Ok(Order {
            id: OrderId::new(),
            user_id: self.user_id,
            placed_at,
            status: OrderStatus::Pending,
            line_items: self.line_items,
            total: self.total,
        })
    }
}

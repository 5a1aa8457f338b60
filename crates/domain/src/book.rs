//! Catalog entities: books and their per-title inventory.

use common::BookId;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A book in the catalog.
///
/// Created by catalog management; the order flow only reads it, and
/// mutates it indirectly through its owned [`Inventory`] row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique book identifier.
    pub id: BookId,

    /// International Standard Book Number (unique across the catalog).
    pub isbn: String,

    /// Title (unique across the catalog; legacy flows look books up by it).
    pub title: String,

    /// Category label, e.g. "Science Fiction".
    pub category: String,

    /// Unit price in minor units.
    pub price: Money,

    /// Author name.
    pub author: String,

    /// Optional cover image reference.
    pub image: Option<String>,
}

/// Remaining purchasable count for one book title.
///
/// One-to-one with [`Book`], keyed by the owning book identifier so
/// callers never juggle a second surrogate key. Invariant: `stock`
/// never goes negative; a decrement that would violate this is
/// rejected before anything is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// The book this stock count belongs to.
    pub book_id: BookId,

    /// Remaining stock. May be exactly zero; never negative.
    pub stock: u32,
}

impl Inventory {
    /// Creates an inventory row for a book with an initial stock count.
    pub fn new(book_id: BookId, stock: u32) -> Self {
        Self { book_id, stock }
    }
}

//! Stock ledger: guarded check-and-decrement of inventory.

use domain::{Book, OrderError};
use store::StoreTx;

use crate::error::{OrdersError, Result};

/// Stock level at or below which a warning is logged after a decrement.
pub const LOW_STOCK_THRESHOLD: u32 = 50;

/// Reserves `quantity` copies of `book` inside the given transaction.
///
/// The single correctness rule is `stock < quantity`: reserving down to
/// exactly zero is valid, going below is rejected before anything is
/// written. Returns the updated stock count.
///
/// The decrement only becomes visible when the caller commits the
/// transaction, so an order that fails on a later line item undoes this
/// reservation by dropping the transaction.
pub async fn reserve<T: StoreTx>(tx: &mut T, book: &Book, quantity: u32) -> Result<u32> {
    if quantity == 0 {
        return Err(OrdersError::Domain(OrderError::InvalidQuantity { quantity }));
    }

    let mut inventory = tx
        .inventory_for_book(book.id)
        .await?
        .ok_or(OrdersError::InventoryNotFound(book.id))?;

    if inventory.stock < quantity {
        return Err(OrdersError::InsufficientStock {
            title: book.title.clone(),
            requested: quantity,
            available: inventory.stock,
        });
    }

    inventory.stock -= quantity;
    tx.put_inventory(&inventory).await?;

    if inventory.stock <= LOW_STOCK_THRESHOLD {
        tracing::warn!(
            title = %book.title,
            stock = inventory.stock,
            "low stock after reservation"
        );
    }

    Ok(inventory.stock)
}

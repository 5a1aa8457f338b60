//! Store and transaction traits.
//!
//! All reads and writes of one logical operation go through a single
//! [`StoreTx`]. Nothing is visible to other callers until
//! [`StoreTx::commit`] runs; dropping a transaction without committing
//! discards every write it made. The order placement flow relies on
//! this for its all-or-nothing guarantee: stock decrements and the
//! order insert either land together or not at all.

use async_trait::async_trait;
use common::{BookId, OrderId, UserId};
use domain::{Book, Inventory, Order, OrderStatus, User};

use crate::error::Result;

/// Handle to the relational store, capable of opening transactions.
#[async_trait]
pub trait Store: Send + Sync {
    /// The transaction type this store hands out.
    type Tx: StoreTx;

    /// Opens a new transaction.
    async fn begin(&self) -> Result<Self::Tx>;
}

/// One open unit of work against the store.
///
/// Reads inside a transaction see the transaction's own writes.
/// Reading the inventory row of a book also takes whatever lock the
/// backend needs so that two concurrent transactions cannot both
/// decrement the same row past its floor.
#[async_trait]
pub trait StoreTx: Send {
    // -- Users --

    /// Resolves a user by identifier.
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>>;

    /// Resolves a user by their unique username.
    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>>;

    /// Inserts a new user row.
    async fn insert_user(&mut self, user: &User) -> Result<()>;

    // -- Catalog --

    /// Resolves a book by identifier.
    async fn find_book(&mut self, id: BookId) -> Result<Option<Book>>;

    /// Resolves a book by its unique title (legacy flows).
    async fn find_book_by_title(&mut self, title: &str) -> Result<Option<Book>>;

    /// Resolves a book by its unique ISBN.
    async fn find_book_by_isbn(&mut self, isbn: &str) -> Result<Option<Book>>;

    /// Inserts a new book row.
    async fn insert_book(&mut self, book: &Book) -> Result<()>;

    // -- Inventory --

    /// Fetches the inventory row owned by a book, locking it for the
    /// remainder of the transaction.
    ///
    /// Inventory is keyed by the owning book identifier; there is no
    /// separate inventory surrogate key for callers to confuse.
    async fn inventory_for_book(&mut self, book_id: BookId) -> Result<Option<Inventory>>;

    /// Writes an inventory row, inserting or replacing it.
    async fn put_inventory(&mut self, inventory: &Inventory) -> Result<()>;

    // -- Orders --

    /// Inserts an order together with all of its line items.
    async fn insert_order(&mut self, order: &Order) -> Result<()>;

    /// Loads an order with its line items.
    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>>;

    /// Lists all orders, oldest first.
    async fn list_orders(&mut self) -> Result<Vec<Order>>;

    /// Lists the orders placed by one user, oldest first.
    async fn list_orders_for_user(&mut self, user_id: UserId) -> Result<Vec<Order>>;

    /// Overwrites the status of an existing order.
    ///
    /// Returns false when no such order exists.
    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<bool>;

    // -- Lifecycle --

    /// Commits every write made through this transaction.
    async fn commit(self) -> Result<()>
    where
        Self: Sized;
}

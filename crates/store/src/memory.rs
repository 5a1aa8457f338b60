//! In-memory store implementation for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{BookId, OrderId, UserId};
use domain::{Book, Inventory, Order, OrderStatus, User};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{Result, StoreError};
use crate::store::{Store, StoreTx};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    books: HashMap<BookId, Book>,
    inventories: HashMap<BookId, Inventory>,
    orders: HashMap<OrderId, Order>,
}

/// In-memory store implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation.
/// Transactions take an exclusive lock on the whole table set and work
/// on a private copy; commit publishes the copy, dropping the
/// transaction discards it. Serializing transactions this way is
/// stricter isolation than the row-level locking the PostgreSQL store
/// uses, but it preserves the same observable guarantee: no two
/// transactions interleave on an inventory row.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the committed stock count for a book, if any.
    pub async fn stock(&self, book_id: BookId) -> Option<u32> {
        self.tables
            .lock()
            .await
            .inventories
            .get(&book_id)
            .map(|inv| inv.stock)
    }

    /// Returns the number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }

    /// Clears all tables.
    pub async fn clear(&self) {
        let mut tables = self.tables.lock().await;
        *tables = Tables::default();
    }
}

/// An open transaction against the in-memory store.
pub struct InMemoryTx {
    shared: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl Store for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<Self::Tx> {
        let shared = Arc::clone(&self.tables).lock_owned().await;
        let working = shared.clone();
        Ok(InMemoryTx { shared, working })
    }
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_user(&mut self, user: &User) -> Result<()> {
        if self.working.users.contains_key(&user.id) {
            return Err(StoreError::Constraint(format!(
                "duplicate user id {}",
                user.id
            )));
        }
        if self
            .working
            .users
            .values()
            .any(|u| u.username == user.username)
        {
            return Err(StoreError::Constraint(format!(
                "duplicate username {}",
                user.username
            )));
        }
        self.working.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_book(&mut self, id: BookId) -> Result<Option<Book>> {
        Ok(self.working.books.get(&id).cloned())
    }

    async fn find_book_by_title(&mut self, title: &str) -> Result<Option<Book>> {
        Ok(self
            .working
            .books
            .values()
            .find(|b| b.title == title)
            .cloned())
    }

    async fn find_book_by_isbn(&mut self, isbn: &str) -> Result<Option<Book>> {
        Ok(self
            .working
            .books
            .values()
            .find(|b| b.isbn == isbn)
            .cloned())
    }

    async fn insert_book(&mut self, book: &Book) -> Result<()> {
        if self.working.books.contains_key(&book.id) {
            return Err(StoreError::Constraint(format!(
                "duplicate book id {}",
                book.id
            )));
        }
        if self
            .working
            .books
            .values()
            .any(|b| b.isbn == book.isbn || b.title == book.title)
        {
            return Err(StoreError::Constraint(format!(
                "duplicate isbn or title for {}",
                book.title
            )));
        }
        self.working.books.insert(book.id, book.clone());
        Ok(())
    }

    async fn inventory_for_book(&mut self, book_id: BookId) -> Result<Option<Inventory>> {
        Ok(self.working.inventories.get(&book_id).copied())
    }

    async fn put_inventory(&mut self, inventory: &Inventory) -> Result<()> {
        self.working
            .inventories
            .insert(inventory.book_id, *inventory);
        Ok(())
    }

    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        if self.working.orders.contains_key(&order.id()) {
            return Err(StoreError::Constraint(format!(
                "duplicate order id {}",
                order.id()
            )));
        }
        self.working.orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn list_orders(&mut self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.working.orders.values().cloned().collect();
        orders.sort_by_key(|o| (o.placed_at(), o.id().as_uuid()));
        Ok(orders)
    }

    async fn list_orders_for_user(&mut self, user_id: UserId) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .working
            .orders
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.placed_at(), o.id().as_uuid()));
        Ok(orders)
    }

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<bool> {
        match self.working.orders.get_mut(&id) {
            Some(order) => {
                order.set_status(status);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn commit(self) -> Result<()> {
        let InMemoryTx {
            mut shared,
            working,
        } = self;
        *shared = working;
        Ok(())
    }
}

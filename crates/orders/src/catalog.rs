//! Catalog service: book registration, lookup, and restocking.

use common::BookId;
use domain::{Book, Inventory, Money};
use serde::{Deserialize, Serialize};
use store::{Store, StoreTx};

use crate::error::{OrdersError, Result};

/// A request to register a book in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub category: String,
    pub price: Money,
    pub author: String,
    pub image: Option<String>,
    pub initial_stock: u32,
}

/// A book together with its current stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub book: Book,
    pub stock: u32,
}

/// Service for maintaining the book catalog and its inventory rows.
pub struct CatalogService<S: Store> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    /// Creates a new catalog service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a book and its inventory row in one transaction.
    ///
    /// ISBN and title must both be unique across the catalog; a clash
    /// on either rejects the whole registration.
    #[tracing::instrument(skip(self, new_book), fields(title = %new_book.title))]
    pub async fn add_book(&self, new_book: NewBook) -> Result<CatalogEntry> {
        let mut tx = self.store.begin().await?;

        if tx.find_book_by_isbn(&new_book.isbn).await?.is_some() {
            return Err(OrdersError::DuplicateBook(new_book.isbn));
        }
        if tx.find_book_by_title(&new_book.title).await?.is_some() {
            return Err(OrdersError::DuplicateBook(new_book.title));
        }

        let book = Book {
            id: BookId::new(),
            isbn: new_book.isbn,
            title: new_book.title,
            category: new_book.category,
            price: new_book.price,
            author: new_book.author,
            image: new_book.image,
        };
        let inventory = Inventory::new(book.id, new_book.initial_stock);

        tx.insert_book(&book).await?;
        tx.put_inventory(&inventory).await?;
        tx.commit().await?;

        metrics::counter!("books_registered_total").increment(1);
        tracing::info!(book_id = %book.id, stock = inventory.stock, "book registered");

        Ok(CatalogEntry {
            book,
            stock: inventory.stock,
        })
    }

    /// Loads a book with its stock count.
    #[tracing::instrument(skip(self))]
    pub async fn get_book(&self, book_id: BookId) -> Result<CatalogEntry> {
        let mut tx = self.store.begin().await?;
        let book = tx
            .find_book(book_id)
            .await?
            .ok_or(OrdersError::BookNotFound(book_id))?;
        let inventory = tx
            .inventory_for_book(book_id)
            .await?
            .ok_or(OrdersError::InventoryNotFound(book_id))?;
        Ok(CatalogEntry {
            book,
            stock: inventory.stock,
        })
    }

    /// Looks a book up by exact title.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_title(&self, title: &str) -> Result<Option<Book>> {
        let mut tx = self.store.begin().await?;
        Ok(tx.find_book_by_title(title).await?)
    }

    /// Adds `additional` copies to a book's inventory, returning the
    /// new stock count.
    #[tracing::instrument(skip(self))]
    pub async fn restock(&self, book_id: BookId, additional: u32) -> Result<u32> {
        let mut tx = self.store.begin().await?;

        tx.find_book(book_id)
            .await?
            .ok_or(OrdersError::BookNotFound(book_id))?;
        let mut inventory = tx
            .inventory_for_book(book_id)
            .await?
            .ok_or(OrdersError::InventoryNotFound(book_id))?;

        inventory.stock += additional;
        tx.put_inventory(&inventory).await?;
        tx.commit().await?;

        tracing::info!(%book_id, stock = inventory.stock, "inventory restocked");
        Ok(inventory.stock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::InMemoryStore;

    fn new_book(title: &str, isbn: &str, stock: u32) -> NewBook {
        NewBook {
            isbn: isbn.to_string(),
            title: title.to_string(),
            category: "Fiction".to_string(),
            price: Money::from_cents(1299),
            author: "Author".to_string(),
            image: None,
            initial_stock: stock,
        }
    }

    #[tokio::test]
    async fn add_book_creates_inventory_row() {
        let store = InMemoryStore::new();
        let service = CatalogService::new(store.clone());

        let entry = service
            .add_book(new_book("Dune", "978-0441172719", 25))
            .await
            .unwrap();

        assert_eq!(entry.stock, 25);
        assert_eq!(store.stock(entry.book.id).await, Some(25));

        let loaded = service.get_book(entry.book.id).await.unwrap();
        assert_eq!(loaded.book.title, "Dune");
        assert_eq!(loaded.stock, 25);
    }

    #[tokio::test]
    async fn duplicate_isbn_is_rejected() {
        let store = InMemoryStore::new();
        let service = CatalogService::new(store);

        service
            .add_book(new_book("Dune", "978-0441172719", 5))
            .await
            .unwrap();
        let err = service
            .add_book(new_book("Dune Messiah", "978-0441172719", 5))
            .await
            .unwrap_err();

        assert!(matches!(err, OrdersError::DuplicateBook(s) if s == "978-0441172719"));
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() {
        let store = InMemoryStore::new();
        let service = CatalogService::new(store);

        service
            .add_book(new_book("Dune", "978-0441172719", 5))
            .await
            .unwrap();
        let err = service
            .add_book(new_book("Dune", "978-0000000000", 5))
            .await
            .unwrap_err();

        assert!(matches!(err, OrdersError::DuplicateBook(s) if s == "Dune"));
    }

    #[tokio::test]
    async fn restock_adds_to_existing_stock() {
        let store = InMemoryStore::new();
        let service = CatalogService::new(store.clone());

        let entry = service
            .add_book(new_book("Dune", "978-0441172719", 3))
            .await
            .unwrap();
        let stock = service.restock(entry.book.id, 7).await.unwrap();

        assert_eq!(stock, 10);
        assert_eq!(store.stock(entry.book.id).await, Some(10));
    }

    #[tokio::test]
    async fn restock_unknown_book_fails() {
        let store = InMemoryStore::new();
        let service = CatalogService::new(store);

        let missing = BookId::new();
        let err = service.restock(missing, 7).await.unwrap_err();
        assert!(matches!(err, OrdersError::BookNotFound(id) if id == missing));
    }
}

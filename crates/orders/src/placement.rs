//! Order placement orchestration and status changes.

use chrono::Utc;
use common::{OrderId, UserId};
use domain::{Order, OrderBuilder, OrderError, OrderStatus};
use serde::{Deserialize, Serialize};
use store::{Store, StoreTx};

use crate::error::{OrdersError, Result};
use crate::ledger;

/// One requested line of a placement: which book, how many copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub book_id: common::BookId,
    pub quantity: u32,
}

/// A placement request: the acting user and the requested lines.
///
/// The user identifier arrives already authenticated and authorized by
/// the HTTP layer; this service only resolves it to an existing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
}

/// Service for placing orders and driving their lifecycle.
pub struct OrderService<S: Store> {
    store: S,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order atomically.
    ///
    /// The whole flow runs inside one store transaction: resolve the
    /// user, then per requested line (in the order supplied) resolve
    /// the book, validate the quantity, and reserve stock through the
    /// ledger; finally build the order graph and insert it. The
    /// transaction commits only after the insert, so a failure at any
    /// step leaves the store exactly as it was, including stock already
    /// reserved for earlier lines.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<Order> {
        let started = std::time::Instant::now();
        let result = self.place_order_in_tx(request).await;
        metrics::histogram!("order_placement_seconds").record(started.elapsed().as_secs_f64());

        match &result {
            Ok(order) => {
                metrics::counter!("orders_placed_total").increment(1);
                tracing::info!(
                    order_id = %order.id(),
                    total_cents = order.total().cents(),
                    lines = order.line_items().len(),
                    "order placed"
                );
            }
            Err(err) => {
                metrics::counter!("orders_failed_total").increment(1);
                tracing::warn!(error = %err, "order placement aborted");
            }
        }

        result
    }

    async fn place_order_in_tx(&self, request: PlaceOrder) -> Result<Order> {
        // Empty orders fail before any lookup happens.
        if request.lines.is_empty() {
            return Err(OrdersError::Domain(OrderError::NoLineItems));
        }

        let mut tx = self.store.begin().await?;

        let user = tx
            .find_user(request.user_id)
            .await?
            .ok_or(OrdersError::UserNotFound(request.user_id))?;

        let mut builder = OrderBuilder::new(user.id);
        for line in &request.lines {
            let book = tx
                .find_book(line.book_id)
                .await?
                .ok_or(OrdersError::BookNotFound(line.book_id))?;

            builder.add_line(&book, line.quantity)?;
            ledger::reserve(&mut tx, &book, line.quantity).await?;
        }

        let order = builder.build(Utc::now())?;
        tx.insert_order(&order).await?;
        tx.commit().await?;

        Ok(order)
    }

    /// Overwrites the status of an existing order.
    ///
    /// The target arrives as a string from the HTTP layer; unknown
    /// values fail with the invalid-status error before the order is
    /// even looked up. Transitions are deliberately permissive: any
    /// recognized status may replace any other.
    #[tracing::instrument(skip(self))]
    pub async fn change_status(&self, order_id: OrderId, target: &str) -> Result<Order> {
        let status: OrderStatus = target.parse().map_err(OrderError::from)?;

        let mut tx = self.store.begin().await?;
        let mut order = tx
            .find_order(order_id)
            .await?
            .ok_or(OrdersError::OrderNotFound(order_id))?;

        tx.set_order_status(order_id, status).await?;
        tx.commit().await?;

        order.set_status(status);
        tracing::info!(%order_id, status = %status, "order status changed");
        Ok(order)
    }

    /// Loads an order by identifier.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        let mut tx = self.store.begin().await?;
        tx.find_order(order_id)
            .await?
            .ok_or(OrdersError::OrderNotFound(order_id))
    }

    /// Lists all orders, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let mut tx = self.store.begin().await?;
        Ok(tx.list_orders().await?)
    }

    /// Lists the orders placed by one user, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let mut tx = self.store.begin().await?;
        Ok(tx.list_orders_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::BookId;
    use domain::{Book, Inventory, Money, Role, User};
    use store::InMemoryStore;

    fn book(title: &str, cents: i64) -> Book {
        Book {
            id: BookId::new(),
            isbn: format!("isbn-{title}"),
            title: title.to_string(),
            category: "Science Fiction".to_string(),
            price: Money::from_cents(cents),
            author: "Author".to_string(),
            image: None,
        }
    }

    async fn seed(store: &InMemoryStore, user: &User, books: &[(&Book, u32)]) {
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(user).await.unwrap();
        for (book, stock) in books {
            tx.insert_book(book).await.unwrap();
            tx.put_inventory(&Inventory::new(book.id, *stock))
                .await
                .unwrap();
        }
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn placement_computes_total_and_decrements_stock() {
        // Scenario: Dune, stock 10, price 1500; order 3 copies.
        let store = InMemoryStore::new();
        let user = User::new("paul", Role::Customer);
        let dune = book("Dune", 1500);
        seed(&store, &user, &[(&dune, 10)]).await;

        let service = OrderService::new(store.clone());
        let order = service
            .place_order(PlaceOrder {
                user_id: user.id,
                lines: vec![OrderLine {
                    book_id: dune.id,
                    quantity: 3,
                }],
            })
            .await
            .unwrap();

        assert_eq!(order.total().cents(), 4500);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(store.stock(dune.id).await, Some(7));
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn insufficient_stock_aborts_and_preserves_inventory() {
        // Scenario: stock 2, order 5.
        let store = InMemoryStore::new();
        let user = User::new("paul", Role::Customer);
        let dune = book("Dune", 1500);
        seed(&store, &user, &[(&dune, 2)]).await;

        let service = OrderService::new(store.clone());
        let err = service
            .place_order(PlaceOrder {
                user_id: user.id,
                lines: vec![OrderLine {
                    book_id: dune.id,
                    quantity: 5,
                }],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OrdersError::InsufficientStock { .. }));
        assert_eq!(store.stock(dune.id).await, Some(2));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn empty_order_fails_before_any_lookup() {
        // No user seeded: the empty check fires before identity resolution.
        let store = InMemoryStore::new();
        let service = OrderService::new(store.clone());

        let err = service
            .place_order(PlaceOrder {
                user_id: UserId::new(),
                lines: vec![],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrdersError::Domain(OrderError::NoLineItems)
        ));
    }

    #[tokio::test]
    async fn unknown_user_aborts_placement() {
        let store = InMemoryStore::new();
        let user = User::new("paul", Role::Customer);
        let dune = book("Dune", 1500);
        seed(&store, &user, &[(&dune, 10)]).await;

        let service = OrderService::new(store.clone());
        let stranger = UserId::new();
        let err = service
            .place_order(PlaceOrder {
                user_id: stranger,
                lines: vec![OrderLine {
                    book_id: dune.id,
                    quantity: 1,
                }],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OrdersError::UserNotFound(id) if id == stranger));
        assert_eq!(store.stock(dune.id).await, Some(10));
    }

    #[tokio::test]
    async fn unknown_book_rolls_back_earlier_reservations() {
        // First line reserves fine; second line references a book that
        // does not exist. Nothing of the first reservation survives.
        let store = InMemoryStore::new();
        let user = User::new("paul", Role::Customer);
        let dune = book("Dune", 1500);
        seed(&store, &user, &[(&dune, 10)]).await;

        let service = OrderService::new(store.clone());
        let ghost = BookId::new();
        let err = service
            .place_order(PlaceOrder {
                user_id: user.id,
                lines: vec![
                    OrderLine {
                        book_id: dune.id,
                        quantity: 4,
                    },
                    OrderLine {
                        book_id: ghost,
                        quantity: 1,
                    },
                ],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OrdersError::BookNotFound(id) if id == ghost));
        assert_eq!(store.stock(dune.id).await, Some(10));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn zero_quantity_line_aborts_whole_order() {
        let store = InMemoryStore::new();
        let user = User::new("paul", Role::Customer);
        let dune = book("Dune", 1500);
        let hobbit = book("The Hobbit", 999);
        seed(&store, &user, &[(&dune, 10), (&hobbit, 5)]).await;

        let service = OrderService::new(store.clone());
        let err = service
            .place_order(PlaceOrder {
                user_id: user.id,
                lines: vec![
                    OrderLine {
                        book_id: dune.id,
                        quantity: 2,
                    },
                    OrderLine {
                        book_id: hobbit.id,
                        quantity: 0,
                    },
                ],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrdersError::Domain(OrderError::InvalidQuantity { quantity: 0 })
        ));
        assert_eq!(store.stock(dune.id).await, Some(10));
        assert_eq!(store.stock(hobbit.id).await, Some(5));
    }

    #[tokio::test]
    async fn change_status_rejects_unknown_order() {
        let store = InMemoryStore::new();
        let service = OrderService::new(store);

        let missing = OrderId::new();
        let err = service.change_status(missing, "SHIPPED").await.unwrap_err();
        assert!(matches!(err, OrdersError::OrderNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn change_status_rejects_unknown_status() {
        let store = InMemoryStore::new();
        let user = User::new("paul", Role::Customer);
        let dune = book("Dune", 1500);
        seed(&store, &user, &[(&dune, 10)]).await;

        let service = OrderService::new(store);
        let order = service
            .place_order(PlaceOrder {
                user_id: user.id,
                lines: vec![OrderLine {
                    book_id: dune.id,
                    quantity: 1,
                }],
            })
            .await
            .unwrap();

        let err = service
            .change_status(order.id(), "TELEPORTED")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrdersError::Domain(OrderError::InvalidStatus(_))
        ));

        // The order is untouched.
        let loaded = service.get_order(order.id()).await.unwrap();
        assert_eq!(loaded.status(), OrderStatus::Pending);
    }

    #[tokio::test]
    async fn change_status_moves_through_lifecycle() {
        let store = InMemoryStore::new();
        let user = User::new("paul", Role::Customer);
        let dune = book("Dune", 1500);
        seed(&store, &user, &[(&dune, 10)]).await;

        let service = OrderService::new(store);
        let order = service
            .place_order(PlaceOrder {
                user_id: user.id,
                lines: vec![OrderLine {
                    book_id: dune.id,
                    quantity: 1,
                }],
            })
            .await
            .unwrap();

        for target in ["CONFIRMED", "SHIPPED", "DELIVERED"] {
            let updated = service.change_status(order.id(), target).await.unwrap();
            assert_eq!(updated.status().as_str(), target);
        }

        let loaded = service.get_order(order.id()).await.unwrap();
        assert_eq!(loaded.status(), OrderStatus::Delivered);
    }
}

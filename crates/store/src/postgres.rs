//! PostgreSQL-backed store implementation.

use async_trait::async_trait;
use common::{BookId, OrderId, UserId};
use domain::{Book, Inventory, LineItem, Money, Order, OrderStatus, User};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{Store, StoreTx};

/// PostgreSQL-backed store.
///
/// Every [`StoreTx`] maps to one database transaction. Inventory reads
/// take a row-level lock (`FOR UPDATE`), so two concurrent placements
/// against the same book serialize on that row and the second one sees
/// the first one's committed decrement.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the given database URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self { pool })
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::debug!("migrations applied");
        Ok(())
    }
}

/// An open transaction against the PostgreSQL store.
pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Store for PostgresStore {
    type Tx = PgStoreTx;

    async fn begin(&self) -> Result<Self::Tx> {
        let tx = self.pool.begin().await?;
        Ok(PgStoreTx { tx })
    }
}

fn row_to_user(row: PgRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    let role = match role.as_str() {
        "Customer" => domain::Role::Customer,
        "Admin" => domain::Role::Admin,
        other => return Err(StoreError::Decode(format!("unknown role {other:?}"))),
    };

    Ok(User {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
        username: row.try_get("username")?,
        role,
    })
}

fn row_to_book(row: PgRow) -> Result<Book> {
    Ok(Book {
        id: BookId::from_uuid(row.try_get::<Uuid, _>("id")?),
        isbn: row.try_get("isbn")?,
        title: row.try_get("title")?,
        category: row.try_get("category")?,
        price: Money::from_cents(row.try_get("price_cents")?),
        author: row.try_get("author")?,
        image: row.try_get("image")?,
    })
}

fn stock_from_i64(stock: i64) -> Result<u32> {
    u32::try_from(stock).map_err(|_| StoreError::Decode(format!("stock out of range: {stock}")))
}

fn order_from_rows(order_row: PgRow, line_rows: Vec<PgRow>) -> Result<Order> {
    let status: String = order_row.try_get("status")?;
    let status: OrderStatus = status
        .parse()
        .map_err(|_| StoreError::Decode(format!("unknown order status {status:?}")))?;

    let mut line_items = Vec::with_capacity(line_rows.len());
    for row in line_rows {
        line_items.push(LineItem {
            book_id: BookId::from_uuid(row.try_get::<Uuid, _>("book_id")?),
            title: row.try_get("title")?,
            quantity: stock_from_i64(row.try_get("quantity")?)?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        });
    }

    Ok(Order::from_parts(
        OrderId::from_uuid(order_row.try_get::<Uuid, _>("id")?),
        UserId::from_uuid(order_row.try_get::<Uuid, _>("user_id")?),
        order_row.try_get("placed_at")?,
        status,
        line_items,
        Money::from_cents(order_row.try_get("total_cents")?),
    ))
}

/// Translates unique/check violations into the typed constraint error.
fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && let Some(constraint) = db_err.constraint()
    {
        return StoreError::Constraint(constraint.to_string());
    }
    StoreError::Database(e)
}

impl PgStoreTx {
    async fn load_line_items(&mut self, order_id: OrderId) -> Result<Vec<PgRow>> {
        let rows = sqlx::query(
            r#"
            SELECT book_id, title, quantity, unit_price_cents
            FROM order_line_items
            WHERE order_id = $1
            ORDER BY position
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn assemble_orders(&mut self, order_rows: Vec<PgRow>) -> Result<Vec<Order>> {
        let mut orders = Vec::with_capacity(order_rows.len());
        for row in order_rows {
            let id = OrderId::from_uuid(row.try_get::<Uuid, _>("id")?);
            let lines = self.load_line_items(id).await?;
            orders.push(order_from_rows(row, lines)?);
        }
        Ok(orders)
    }
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, role FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_user).transpose()
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, role FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_user).transpose()
    }

    async fn insert_user(&mut self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, username, role) VALUES ($1, $2, $3)")
            .bind(user.id.as_uuid())
            .bind(&user.username)
            .bind(user.role.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(map_insert_error)?;
        Ok(())
    }

    async fn find_book(&mut self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            "SELECT id, isbn, title, category, price_cents, author, image FROM books WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_book).transpose()
    }

    async fn find_book_by_title(&mut self, title: &str) -> Result<Option<Book>> {
        let row = sqlx::query(
            "SELECT id, isbn, title, category, price_cents, author, image FROM books WHERE title = $1",
        )
        .bind(title)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_book).transpose()
    }

    async fn find_book_by_isbn(&mut self, isbn: &str) -> Result<Option<Book>> {
        let row = sqlx::query(
            "SELECT id, isbn, title, category, price_cents, author, image FROM books WHERE isbn = $1",
        )
        .bind(isbn)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(row_to_book).transpose()
    }

    async fn insert_book(&mut self, book: &Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (id, isbn, title, category, price_cents, author, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(book.id.as_uuid())
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.category)
        .bind(book.price.cents())
        .bind(&book.author)
        .bind(&book.image)
        .execute(&mut *self.tx)
        .await
        .map_err(map_insert_error)?;
        Ok(())
    }

    async fn inventory_for_book(&mut self, book_id: BookId) -> Result<Option<Inventory>> {
        // FOR UPDATE holds the row until this transaction resolves, so
        // concurrent decrements of the same title serialize here.
        let row = sqlx::query("SELECT book_id, stock FROM inventories WHERE book_id = $1 FOR UPDATE")
            .bind(book_id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;

        match row {
            Some(row) => Ok(Some(Inventory {
                book_id: BookId::from_uuid(row.try_get::<Uuid, _>("book_id")?),
                stock: stock_from_i64(row.try_get("stock")?)?,
            })),
            None => Ok(None),
        }
    }

    async fn put_inventory(&mut self, inventory: &Inventory) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO inventories (book_id, stock)
            VALUES ($1, $2)
            ON CONFLICT (book_id) DO UPDATE SET stock = EXCLUDED.stock
            "#,
        )
        .bind(inventory.book_id.as_uuid())
        .bind(i64::from(inventory.stock))
        .execute(&mut *self.tx)
        .await
        .map_err(map_insert_error)?;
        Ok(())
    }

    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, placed_at, status, total_cents)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.user_id().as_uuid())
        .bind(order.placed_at())
        .bind(order.status().as_str())
        .bind(order.total().cents())
        .execute(&mut *self.tx)
        .await
        .map_err(map_insert_error)?;

        for (position, line) in order.line_items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_line_items (order_id, position, book_id, title, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order.id().as_uuid())
            .bind(position as i32)
            .bind(line.book_id.as_uuid())
            .bind(&line.title)
            .bind(i64::from(line.quantity))
            .bind(line.unit_price.cents())
            .execute(&mut *self.tx)
            .await
            .map_err(map_insert_error)?;
        }

        Ok(())
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, user_id, placed_at, status, total_cents FROM orders WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        match row {
            Some(row) => {
                let lines = self.load_line_items(id).await?;
                Ok(Some(order_from_rows(row, lines)?))
            }
            None => Ok(None),
        }
    }

    async fn list_orders(&mut self) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT id, user_id, placed_at, status, total_cents FROM orders ORDER BY placed_at, id",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        self.assemble_orders(rows).await
    }

    async fn list_orders_for_user(&mut self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, placed_at, status, total_cents
            FROM orders
            WHERE user_id = $1
            ORDER BY placed_at, id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;
        self.assemble_orders(rows).await
    }

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

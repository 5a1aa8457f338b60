//! Catalog endpoints: book registration, lookup, and restocking.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::BookId;
use domain::Money;
use orders::{CatalogEntry, NewBook};
use serde::{Deserialize, Serialize};
use store::Store;

use crate::error::ApiError;
use crate::routes::orders::{AppState, parse_uuid};

// -- Request types --

#[derive(Deserialize)]
pub struct CreateBookRequest {
    pub isbn: String,
    pub title: String,
    pub category: String,
    pub price_cents: i64,
    pub author: String,
    pub image: Option<String>,
    #[serde(default)]
    pub initial_stock: u32,
}

#[derive(Deserialize)]
pub struct RestockRequest {
    pub additional: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct BookResponse {
    pub id: String,
    pub isbn: String,
    pub title: String,
    pub category: String,
    pub price_cents: i64,
    pub author: String,
    pub image: Option<String>,
    pub stock: u32,
}

#[derive(Serialize)]
pub struct StockResponse {
    pub book_id: String,
    pub stock: u32,
}

impl From<CatalogEntry> for BookResponse {
    fn from(entry: CatalogEntry) -> Self {
        BookResponse {
            id: entry.book.id.to_string(),
            isbn: entry.book.isbn,
            title: entry.book.title,
            category: entry.book.category,
            price_cents: entry.book.price.cents(),
            author: entry.book.author,
            image: entry.book.image,
            stock: entry.stock,
        }
    }
}

// -- Handlers --

/// POST /books — register a book with its initial stock.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(axum::http::StatusCode, Json<BookResponse>), ApiError> {
    let entry = state
        .catalog
        .add_book(NewBook {
            isbn: req.isbn,
            title: req.title,
            category: req.category,
            price: Money::from_cents(req.price_cents),
            author: req.author,
            image: req.image,
            initial_stock: req.initial_stock,
        })
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(BookResponse::from(entry)),
    ))
}

/// GET /books/:id — load a book with its stock count.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book_id = BookId::from_uuid(parse_uuid(&id)?);
    let entry = state.catalog.get_book(book_id).await?;
    Ok(Json(BookResponse::from(entry)))
}

/// PUT /books/:id/stock — add copies to a book's inventory.
#[tracing::instrument(skip(state, req))]
pub async fn restock<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<RestockRequest>,
) -> Result<Json<StockResponse>, ApiError> {
    let book_id = BookId::from_uuid(parse_uuid(&id)?);
    let stock = state.catalog.restock(book_id, req.additional).await?;
    Ok(Json(StockResponse {
        book_id: book_id.to_string(),
        stock,
    }))
}

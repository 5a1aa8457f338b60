//! Order placement and lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{BookId, OrderId, UserId};
use domain::Order;
use orders::{CatalogService, IdentityService, OrderLine, OrderService, PlaceOrder};
use serde::{Deserialize, Serialize};
use store::Store;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub orders: OrderService<S>,
    pub catalog: CatalogService<S>,
    pub identity: IdentityService<S>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: String,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Deserialize)]
pub struct OrderLineRequest {
    pub book_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub placed_at: String,
    pub status: String,
    pub items: Vec<LineItemResponse>,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct LineItemResponse {
    pub book_id: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        let items = order
            .line_items()
            .iter()
            .map(|item| LineItemResponse {
                book_id: item.book_id.to_string(),
                title: item.title.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price.cents(),
                subtotal_cents: item.subtotal().cents(),
            })
            .collect();

        OrderResponse {
            id: order.id().to_string(),
            user_id: order.user_id().to_string(),
            placed_at: order.placed_at().to_rfc3339(),
            status: order.status().to_string(),
            items,
            total_cents: order.total().cents(),
        }
    }
}

// -- Handlers --

/// POST /orders — place an order for a user.
#[tracing::instrument(skip(state, req))]
pub async fn place<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&req.user_id)?);
    let lines = req
        .items
        .iter()
        .map(|item| {
            Ok(OrderLine {
                book_id: BookId::from_uuid(parse_uuid(&item.book_id)?),
                quantity: item.quantity,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let order = state
        .orders
        .place_order(PlaceOrder { user_id, lines })
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(OrderResponse::from(&order)),
    ))
}

/// GET /orders/:id — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&id)?);
    let order = state.orders.get_order(order_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// GET /orders — list all orders, oldest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list_orders().await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /users/:id/orders — list the orders placed by one user.
#[tracing::instrument(skip(state))]
pub async fn list_for_user<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&id)?);
    let orders = state.orders.list_orders_for_user(user_id).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// PUT /orders/:id/status — overwrite an order's status.
#[tracing::instrument(skip(state, req))]
pub async fn set_status<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&id)?);
    let order = state.orders.change_status(order_id, &req.status).await?;
    Ok(Json(OrderResponse::from(&order)))
}

pub(crate) fn parse_uuid(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}

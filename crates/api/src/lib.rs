//! HTTP API server with observability for the bookstore backend.
//!
//! Provides REST endpoints for the catalog, user registration, and the
//! order workflow, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{CatalogService, IdentityService, OrderService};
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::place::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/status", put(routes::orders::set_status::<S>))
        .route("/books", post(routes::books::create::<S>))
        .route("/books/{id}", get(routes::books::get::<S>))
        .route("/books/{id}/stock", put(routes::books::restock::<S>))
        .route("/users", post(routes::users::register::<S>))
        .route("/users/{id}", get(routes::users::get::<S>))
        .route("/users/{id}/orders", get(routes::orders::list_for_user::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state: one service per concern, all sharing
/// the same store.
pub fn create_state<S: Store + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        orders: OrderService::new(store.clone()),
        catalog: CatalogService::new(store.clone()),
        identity: IdentityService::new(store),
    })
}

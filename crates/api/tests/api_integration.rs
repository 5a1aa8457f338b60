//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use store::InMemoryStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let state = api::create_state(InMemoryStore::new());
    api::create_app(state, get_metrics_handle())
}

async fn post_json(app: &axum::Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, body).await
}

async fn put_json(app: &axum::Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    send_json(app, "PUT", uri, body).await
}

async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn register_user(app: &axum::Router, username: &str) -> String {
    let (status, json) = post_json(app, "/users", serde_json::json!({ "username": username })).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

async fn register_book(app: &axum::Router, title: &str, isbn: &str, cents: i64, stock: u32) -> String {
    let (status, json) = post_json(
        app,
        "/books",
        serde_json::json!({
            "isbn": isbn,
            "title": title,
            "category": "Science Fiction",
            "price_cents": cents,
            "author": "Frank Herbert",
            "initial_stock": stock
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, json) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_place_order() {
    let app = setup();
    let user_id = register_user(&app, "paul").await;
    let book_id = register_book(&app, "Dune", "978-0441172719", 1500, 10).await;

    let (status, order) = post_json(
        &app,
        "/orders",
        serde_json::json!({
            "user_id": user_id,
            "items": [{ "book_id": book_id, "quantity": 3 }]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["total_cents"], 4500);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["items"][0]["title"], "Dune");
    assert_eq!(order["items"][0]["subtotal_cents"], 4500);

    // Stock was decremented.
    let (status, book) = get_json(&app, &format!("/books/{book_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["stock"], 7);
}

#[tokio::test]
async fn test_place_order_insufficient_stock() {
    let app = setup();
    let user_id = register_user(&app, "paul").await;
    let book_id = register_book(&app, "Dune", "978-0441172719", 1500, 2).await;

    let (status, json) = post_json(
        &app,
        "/orders",
        serde_json::json!({
            "user_id": user_id,
            "items": [{ "book_id": book_id, "quantity": 5 }]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Insufficient stock"));

    let (_, book) = get_json(&app, &format!("/books/{book_id}")).await;
    assert_eq!(book["stock"], 2);
}

#[tokio::test]
async fn test_place_empty_order() {
    let app = setup();
    let user_id = register_user(&app, "paul").await;

    let (status, _) = post_json(
        &app,
        "/orders",
        serde_json::json!({ "user_id": user_id, "items": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_place_order_unknown_user() {
    let app = setup();
    let book_id = register_book(&app, "Dune", "978-0441172719", 1500, 10).await;
    let fake_user = uuid::Uuid::new_v4();

    let (status, _) = post_json(
        &app,
        "/orders",
        serde_json::json!({
            "user_id": fake_user.to_string(),
            "items": [{ "book_id": book_id, "quantity": 1 }]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_nonexistent_order() {
    let app = setup();
    let fake_id = uuid::Uuid::new_v4();

    let (status, _) = get_json(&app, &format!("/orders/{fake_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_order_id_format() {
    let app = setup();
    let (status, _) = get_json(&app, "/orders/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_orders_for_user() {
    let app = setup();
    let user_id = register_user(&app, "paul").await;
    let other_id = register_user(&app, "leto").await;
    let book_id = register_book(&app, "Dune", "978-0441172719", 1500, 10).await;

    let (status, _) = post_json(
        &app,
        "/orders",
        serde_json::json!({
            "user_id": user_id,
            "items": [{ "book_id": book_id, "quantity": 1 }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, orders) = get_json(&app, &format!("/users/{user_id}/orders")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (status, orders) = get_json(&app, &format!("/users/{other_id}/orders")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 0);

    let (status, orders) = get_json(&app, "/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_status_update() {
    let app = setup();
    let user_id = register_user(&app, "paul").await;
    let book_id = register_book(&app, "Dune", "978-0441172719", 1500, 10).await;

    let (_, order) = post_json(
        &app,
        "/orders",
        serde_json::json!({
            "user_id": user_id,
            "items": [{ "book_id": book_id, "quantity": 1 }]
        }),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, updated) = put_json(
        &app,
        &format!("/orders/{order_id}/status"),
        serde_json::json!({ "status": "SHIPPED" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "SHIPPED");

    // Unknown status is rejected.
    let (status, json) = put_json(
        &app,
        &format!("/orders/{order_id}/status"),
        serde_json::json!({ "status": "TELEPORTED" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("TELEPORTED"));

    // Unknown order is a 404.
    let fake_id = uuid::Uuid::new_v4();
    let (status, _) = put_json(
        &app,
        &format!("/orders/{fake_id}/status"),
        serde_json::json!({ "status": "SHIPPED" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_book_conflict() {
    let app = setup();
    register_book(&app, "Dune", "978-0441172719", 1500, 10).await;

    let (status, json) = post_json(
        &app,
        "/books",
        serde_json::json!({
            "isbn": "978-0441172719",
            "title": "Dune Messiah",
            "category": "Science Fiction",
            "price_cents": 1600,
            "author": "Frank Herbert",
            "initial_stock": 5
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("978-0441172719"));
}

#[tokio::test]
async fn test_duplicate_username_conflict() {
    let app = setup();
    register_user(&app, "paul").await;

    let (status, _) = post_json(&app, "/users", serde_json::json!({ "username": "paul" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_restock() {
    let app = setup();
    let book_id = register_book(&app, "Dune", "978-0441172719", 1500, 3).await;

    let (status, json) = put_json(
        &app,
        &format!("/books/{book_id}/stock"),
        serde_json::json!({ "additional": 7 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stock"], 10);

    // Restocking an unknown book is a 404.
    let fake_id = uuid::Uuid::new_v4();
    let (status, _) = put_json(
        &app,
        &format!("/books/{fake_id}/stock"),
        serde_json::json!({ "additional": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_admin_user() {
    let app = setup();

    let (status, json) = post_json(
        &app,
        "/users",
        serde_json::json!({ "username": "irulan", "role": "Admin" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["role"], "Admin");

    let user_id = json["id"].as_str().unwrap();
    let (status, loaded) = get_json(&app, &format!("/users/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["username"], "irulan");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

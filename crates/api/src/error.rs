//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orders::OrdersError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Service-level error.
    Service(OrdersError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Service(err) => service_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn service_error_to_response(err: OrdersError) -> (StatusCode, String) {
    match &err {
        OrdersError::UserNotFound(_)
        | OrdersError::BookNotFound(_)
        | OrdersError::InventoryNotFound(_)
        | OrdersError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        OrdersError::InsufficientStock { .. } | OrdersError::Domain(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        OrdersError::DuplicateBook(_) | OrdersError::DuplicateUsername(_) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        OrdersError::Store(store_err) => {
            tracing::error!(error = %store_err, "store error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<OrdersError> for ApiError {
    fn from(err: OrdersError) -> Self {
        ApiError::Service(err)
    }
}

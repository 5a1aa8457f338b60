//! User registration and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::UserId;
use domain::{Role, User};
use serde::{Deserialize, Serialize};
use store::Store;

use crate::error::ApiError;
use crate::routes::orders::{AppState, parse_uuid};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.to_string(),
            username: user.username,
            role: user.role.to_string(),
        }
    }
}

/// POST /users — register a user.
#[tracing::instrument(skip(state, req))]
pub async fn register<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(axum::http::StatusCode, Json<UserResponse>), ApiError> {
    let user = state.identity.register(&req.username, req.role).await?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(UserResponse::from(user)),
    ))
}

/// GET /users/:id — load a user by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&id)?);
    let user = state.identity.find_user(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

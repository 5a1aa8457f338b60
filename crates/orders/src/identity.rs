//! Identity service: user registration and lookup.

use common::UserId;
use domain::{Role, User};
use store::{Store, StoreTx};

use crate::error::{OrdersError, Result};

/// Service for registering and resolving users.
pub struct IdentityService<S: Store> {
    store: S,
}

impl<S: Store> IdentityService<S> {
    /// Creates a new identity service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a user. Usernames are unique.
    #[tracing::instrument(skip(self))]
    pub async fn register(&self, username: &str, role: Role) -> Result<User> {
        let mut tx = self.store.begin().await?;

        if tx.find_user_by_username(username).await?.is_some() {
            return Err(OrdersError::DuplicateUsername(username.to_string()));
        }

        let user = User::new(username, role);
        tx.insert_user(&user).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Loads a user by identifier.
    #[tracing::instrument(skip(self))]
    pub async fn find_user(&self, user_id: UserId) -> Result<User> {
        let mut tx = self.store.begin().await?;
        tx.find_user(user_id)
            .await?
            .ok_or(OrdersError::UserNotFound(user_id))
    }
}

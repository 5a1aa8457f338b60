//! Registered users and their roles.

use common::UserId;
use serde::{Deserialize, Serialize};

/// Access role of a registered user.
///
/// Authorization decisions happen in the HTTP layer; the order flow
/// only needs a resolved user identity, so this stays a plain enum
/// rather than the authority strings the auth layer trades in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user, referenced by orders as the placing party.
///
/// Credentials live in the excluded auth layer and are never part of
/// this model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,

    /// Login name (unique).
    pub username: String,

    /// Access role.
    pub role: Role,
}

impl User {
    /// Creates a new user with a fresh identifier.
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            role,
        }
    }
}

use thiserror::Error;

/// Errors that can occur when interacting with the relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A uniqueness or check constraint was violated.
    ///
    /// The services check preconditions before writing, so this is the
    /// database-level backstop rather than the primary signal.
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// A stored row could not be decoded into its domain type.
    #[error("Corrupt row: {0}")]
    Decode(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

//! Error types for coinshop storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record (`account`, `item`).
        entity: &'static str,
        /// Key that was looked up.
        id: String,
    },

    /// A debit was rejected by the non-negative balance constraint.
    #[error("insufficient funds: {username} cannot be debited {amount}")]
    InsufficientFunds {
        /// The account that would have gone negative.
        username: String,
        /// The attempted debit.
        amount: i64,
    },

    /// An insert collided with an existing unique key.
    #[error("account already exists: {username}")]
    AlreadyExists {
        /// The contested username.
        username: String,
    },

    /// A ledger primitive was called with a non-positive amount.
    #[error("amount must be positive, got {0}")]
    InvalidAmount(i64),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Database(format!("migration failed: {err}"))
    }
}

impl From<StoreError> for coinshop_core::ShopError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientFunds { username, amount } => Self::InsufficientFunds {
                username,
                required: amount,
            },
            StoreError::AlreadyExists { username } => Self::AccountAlreadyExists { username },
            StoreError::NotFound { entity: "item", id } => Self::UnknownItem { item: id },
            StoreError::NotFound { id, .. } => Self::AccountNotFound { username: id },
            StoreError::InvalidAmount(amount) => Self::InvalidAmount { amount },
            StoreError::Database(msg) => Self::Storage(msg),
        }
    }
}

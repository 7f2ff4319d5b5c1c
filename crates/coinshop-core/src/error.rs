//! Error types for coinshop.

use crate::ids::IdError;

/// Result type for coinshop operations.
pub type Result<T> = std::result::Result<T, ShopError>;

/// Errors that can occur in coinshop operations.
///
/// Every variant except [`ShopError::Storage`] is a business-rule or input rejection:
/// retrying with the same inputs gives the same answer. A storage failure leaves no
/// partial effects behind (the scope either committed or aborted as a whole), so the
/// caller may retry it unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    /// Malformed or missing request field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Transfer amount is not positive.
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount.
        amount: i64,
    },

    /// Transfer recipient is empty or not an acceptable counterparty.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The balance does not cover the debit.
    #[error("insufficient funds: {username} cannot pay {required}")]
    InsufficientFunds {
        /// The account that would have been overdrawn.
        username: String,
        /// The amount that was requested.
        required: i64,
    },

    /// The item is not in the catalog.
    #[error("unknown item: {item}")]
    UnknownItem {
        /// The requested item name.
        item: String,
    },

    /// The transfer recipient does not exist.
    #[error("unknown recipient: {username}")]
    UnknownRecipient {
        /// The requested recipient.
        username: String,
    },

    /// Authentication failed (bad password, bad or expired token).
    #[error("invalid credential")]
    InvalidCredential,

    /// An account with this username was created concurrently.
    #[error("account already exists: {username}")]
    AccountAlreadyExists {
        /// The contested username.
        username: String,
    },

    /// Account not found.
    #[error("account not found: {username}")]
    AccountNotFound {
        /// The username that was not found.
        username: String,
    },

    /// Infrastructure failure in the storage layer.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ShopError {
    /// Whether the caller may retry the same request unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<IdError> for ShopError {
    fn from(err: IdError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

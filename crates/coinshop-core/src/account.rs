//! Account types for coinshop.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Username;

/// Coins credited to every account exactly once, when it is created.
pub const STARTING_BALANCE: i64 = 1000;

/// A user's account: identity, credential hash and coin balance.
///
/// The balance is never negative in any committed state. It is only changed by the
/// ledger primitives of a store, inside a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Unique, immutable username.
    pub username: Username,

    /// One-way hash of the account password (PHC string format).
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Current coin balance.
    pub balance: i64,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// The data needed to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Username for the new account.
    pub username: Username,
    /// Password hash to store.
    pub password_hash: String,
    /// Opening balance.
    pub balance: i64,
}

impl NewAccount {
    /// An account opened with the fixed [`STARTING_BALANCE`].
    #[must_use]
    pub fn with_starting_balance(username: Username, password_hash: String) -> Self {
        Self {
            username,
            password_hash,
            balance: STARTING_BALANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_gets_starting_balance() {
        let new = NewAccount::with_starting_balance(Username::new("alice").unwrap(), "hash".into());
        assert_eq!(new.balance, 1000);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let account = Account {
            username: Username::new("alice").unwrap(),
            password_hash: "$argon2id$secret".into(),
            balance: 1000,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["balance"], 1000);
    }
}

//! Database schema definitions.
//!
//! The DDL lives in `migrations/` and is embedded into the binary by
//! [`crate::PgStore::migrate`]. This module names the constraints whose violations the
//! store translates into domain errors.

/// Named constraints whose violations carry business meaning.
pub mod constraint {
    /// `CHECK (balance >= 0)` on `users`.
    pub const BALANCE_NON_NEGATIVE: &str = "users_balance_non_negative";

    /// Primary key on `users.username`.
    pub const USERS_PKEY: &str = "users_pkey";
}

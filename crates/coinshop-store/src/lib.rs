//! Transactional storage layer for coinshop.
//!
//! This crate owns every read and write of account balances. It exposes two traits:
//!
//! - [`Store`]: a handle to the backend. Opens scopes, creates accounts, serves the
//!   read model, and offers auto-committed variants of the ledger primitives.
//! - [`LedgerScope`]: one atomic unit of work. The ledger primitives (debit, credit,
//!   record purchase, record transfer) called through a scope share its fate: they
//!   become visible together on [`LedgerScope::commit`] or not at all.
//!
//! Dropping a scope without committing aborts it. An early return, a `?`, or a
//! cancelled request future therefore never leaves partial effects behind.
//!
//! # Backends
//!
//! - [`PgStore`]: PostgreSQL through sqlx. Non-negative balances are enforced by the
//!   `users_balance_non_negative` CHECK constraint, duplicate accounts by the primary key.
//! - [`MemoryStore`]: an in-process store with the same guarantees, used by tests and
//!   local development.
//!
//! # Example
//!
//! ```no_run
//! use coinshop_core::Username;
//! use coinshop_store::{LedgerScope, MemoryStore, Store};
//!
//! # async fn demo() -> coinshop_store::Result<()> {
//! let store = MemoryStore::new();
//! let alice = Username::new("alice").unwrap();
//!
//! let mut scope = store.begin().await?;
//! scope.debit(&alice, 80).await?;
//! scope.record_purchase(&alice, "t-shirt").await?;
//! scope.commit().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod postgres;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::{MemoryScope, MemoryStore};
pub use postgres::{PgScope, PgStore};

use async_trait::async_trait;
use coinshop_core::{Account, InventoryItem, NewAccount, ReceivedTransfer, SentTransfer, Username};

/// One atomic unit of ledger work.
///
/// All mutations made through a scope are applied together by [`commit`](Self::commit)
/// or discarded together by [`abort`](Self::abort) (or by dropping the scope). No other
/// reader observes a scope's intermediate state.
#[async_trait]
pub trait LedgerScope: Send {
    /// Look up an account inside the scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn find_account(&mut self, username: &Username) -> Result<Option<Account>>;

    /// Look up the price of a catalog item inside the scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn item_price(&mut self, item: &str) -> Result<Option<i64>>;

    /// Decrease a balance by `amount`, returning the new balance.
    ///
    /// There is no read-then-compare: the decrement is a single write and the store's
    /// non-negativity rule rejects it if it would overdraw the account.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidAmount` if `amount <= 0`.
    /// - `StoreError::InsufficientFunds` if the balance would go negative.
    /// - `StoreError::NotFound` if the account doesn't exist.
    async fn debit(&mut self, username: &Username, amount: i64) -> Result<i64>;

    /// Increase a balance by `amount`, returning the new balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidAmount` if `amount <= 0`.
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::Database` if the balance overflows the storage integer.
    async fn credit(&mut self, username: &Username, amount: i64) -> Result<i64>;

    /// Append a purchase record for one unit of `item`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn record_purchase(&mut self, username: &Username, item: &str) -> Result<()>;

    /// Append a transfer record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidAmount` if `amount <= 0`, or an error if the database
    /// operation fails.
    async fn record_transfer(
        &mut self,
        sender: &Username,
        recipient: &Username,
        amount: i64,
    ) -> Result<()>;

    /// Durably apply every mutation made through the scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails, in which case nothing was applied.
    async fn commit(self) -> Result<()>;

    /// Discard every mutation made through the scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend reports a failure while rolling back. The
    /// mutations are discarded regardless.
    async fn abort(self) -> Result<()>;
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (PostgreSQL, in-memory for testing).
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// The scope type opened by [`begin`](Self::begin).
    type Scope: LedgerScope + 'static;

    /// Open a new scope.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection or transaction can be obtained.
    async fn begin(&self) -> Result<Self::Scope>;

    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Get an account by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_account(&self, username: &Username) -> Result<Option<Account>>;

    /// Insert a new account as its own atomic unit.
    ///
    /// # Errors
    ///
    /// - `StoreError::AlreadyExists` if the username is taken.
    /// - `StoreError::Database` if the database operation fails.
    async fn create_account(&self, account: &NewAccount) -> Result<Account>;

    // =========================================================================
    // Read Model
    // =========================================================================

    /// Get the price of a catalog item.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_item_price(&self, item: &str) -> Result<Option<i64>>;

    /// Per-item purchase counts for an account, ordered by item name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_inventory(&self, username: &Username) -> Result<Vec<InventoryItem>>;

    /// Transfers received by an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_received(&self, username: &Username) -> Result<Vec<ReceivedTransfer>>;

    /// Transfers sent by an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_sent(&self, username: &Username) -> Result<Vec<SentTransfer>>;

    // =========================================================================
    // Auto-committed Primitives
    // =========================================================================

    /// Debit an account in a scope of its own.
    ///
    /// # Errors
    ///
    /// See [`LedgerScope::debit`].
    async fn debit(&self, username: &Username, amount: i64) -> Result<i64> {
        let mut scope = self.begin().await?;
        let balance = scope.debit(username, amount).await?;
        scope.commit().await?;
        Ok(balance)
    }

    /// Credit an account in a scope of its own.
    ///
    /// # Errors
    ///
    /// See [`LedgerScope::credit`].
    async fn credit(&self, username: &Username, amount: i64) -> Result<i64> {
        let mut scope = self.begin().await?;
        let balance = scope.credit(username, amount).await?;
        scope.commit().await?;
        Ok(balance)
    }

    /// Record a purchase in a scope of its own.
    ///
    /// # Errors
    ///
    /// See [`LedgerScope::record_purchase`].
    async fn record_purchase(&self, username: &Username, item: &str) -> Result<()> {
        let mut scope = self.begin().await?;
        scope.record_purchase(username, item).await?;
        scope.commit().await
    }

    /// Record a transfer in a scope of its own.
    ///
    /// # Errors
    ///
    /// See [`LedgerScope::record_transfer`].
    async fn record_transfer(
        &self,
        sender: &Username,
        recipient: &Username,
        amount: i64,
    ) -> Result<()> {
        let mut scope = self.begin().await?;
        scope.record_transfer(sender, recipient, amount).await?;
        scope.commit().await
    }
}

/// Reject non-positive amounts before they reach storage.
pub(crate) fn ensure_positive(amount: i64) -> Result<()> {
    if amount > 0 {
        Ok(())
    } else {
        Err(StoreError::InvalidAmount(amount))
    }
}

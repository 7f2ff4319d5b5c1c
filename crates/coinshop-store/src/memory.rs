//! In-memory storage implementation.
//!
//! `MemoryStore` keeps every table behind one async mutex. A scope holds the lock
//! guard for its whole lifetime, so scopes are fully serialized, and it records an
//! undo entry for every mutation. Commit forgets the undo log; abort or drop replays
//! it in reverse. Readers outside a scope take the same lock and therefore never see
//! a scope's intermediate state.
//!
//! The non-negative balance rule is enforced by the store itself at write time, the
//! same way the PostgreSQL CHECK constraint is, so callers cannot tell the backends
//! apart.
//!
//! A task holding a scope must not call back into the same `MemoryStore` outside that
//! scope: the lock is not reentrant.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use coinshop_core::{
    default_catalog, Account, CatalogItem, InventoryItem, NewAccount, PurchaseRecord,
    ReceivedTransfer, SentTransfer, TransferRecord, Username,
};

use crate::error::{Result, StoreError};
use crate::{ensure_positive, LedgerScope, Store};

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<Username, Account>,
    catalog: HashMap<String, i64>,
    purchases: Vec<PurchaseRecord>,
    transfers: Vec<TransferRecord>,
}

impl Tables {
    fn account_mut(&mut self, username: &Username) -> Result<&mut Account> {
        self.accounts
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound {
                entity: "account",
                id: username.to_string(),
            })
    }

    /// Foreign-key check for fact inserts; a violation is a plain database error.
    fn ensure_account_exists(&self, username: &Username) -> Result<()> {
        if self.accounts.contains_key(username) {
            Ok(())
        } else {
            Err(StoreError::Database(format!(
                "foreign key violation: no account {username}"
            )))
        }
    }
}

/// In-process storage implementation.
///
/// Cloning is cheap and every clone shares the same tables.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store stocked with the default catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(default_catalog())
    }

    /// Create an empty store stocked with `items`.
    #[must_use]
    pub fn with_catalog(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let tables = Tables {
            catalog: items.into_iter().map(|item| (item.name, item.price)).collect(),
            ..Tables::default()
        };
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    /// Sum of all account balances.
    pub async fn total_balance(&self) -> i64 {
        self.tables
            .lock()
            .await
            .accounts
            .values()
            .map(|account| account.balance)
            .sum()
    }

    /// Number of accounts.
    pub async fn account_count(&self) -> usize {
        self.tables.lock().await.accounts.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Reverse of one mutation made through a [`MemoryScope`].
#[derive(Debug)]
enum Undo {
    Balance { username: Username, previous: i64 },
    Purchase,
    Transfer,
}

/// An exclusive, rollback-on-drop scope over a [`MemoryStore`].
pub struct MemoryScope {
    tables: OwnedMutexGuard<Tables>,
    undo: Vec<Undo>,
}

impl MemoryScope {
    fn rollback(&mut self) {
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::Balance { username, previous } => {
                    if let Some(account) = self.tables.accounts.get_mut(&username) {
                        account.balance = previous;
                    }
                }
                Undo::Purchase => {
                    self.tables.purchases.pop();
                }
                Undo::Transfer => {
                    self.tables.transfers.pop();
                }
            }
        }
    }
}

impl Drop for MemoryScope {
    fn drop(&mut self) {
        if !self.undo.is_empty() {
            tracing::debug!(pending = self.undo.len(), "Rolling back uncommitted scope");
            self.rollback();
        }
    }
}

#[async_trait]
impl LedgerScope for MemoryScope {
    async fn find_account(&mut self, username: &Username) -> Result<Option<Account>> {
        Ok(self.tables.accounts.get(username).cloned())
    }

    async fn item_price(&mut self, item: &str) -> Result<Option<i64>> {
        Ok(self.tables.catalog.get(item).copied())
    }

    async fn debit(&mut self, username: &Username, amount: i64) -> Result<i64> {
        ensure_positive(amount)?;

        let account = self.tables.account_mut(username)?;
        let previous = account.balance;
        let next = previous
            .checked_sub(amount)
            .ok_or_else(|| StoreError::Database("balance out of range".into()))?;
        if next < 0 {
            return Err(StoreError::InsufficientFunds {
                username: username.to_string(),
                amount,
            });
        }

        account.balance = next;
        self.undo.push(Undo::Balance {
            username: username.clone(),
            previous,
        });
        Ok(next)
    }

    async fn credit(&mut self, username: &Username, amount: i64) -> Result<i64> {
        ensure_positive(amount)?;

        let account = self.tables.account_mut(username)?;
        let previous = account.balance;
        let next = previous
            .checked_add(amount)
            .ok_or_else(|| StoreError::Database("balance out of range".into()))?;

        account.balance = next;
        self.undo.push(Undo::Balance {
            username: username.clone(),
            previous,
        });
        Ok(next)
    }

    async fn record_purchase(&mut self, username: &Username, item: &str) -> Result<()> {
        self.tables.ensure_account_exists(username)?;
        if !self.tables.catalog.contains_key(item) {
            return Err(StoreError::Database(format!(
                "foreign key violation: no item {item}"
            )));
        }

        self.tables.purchases.push(PurchaseRecord {
            username: username.clone(),
            item_name: item.to_string(),
            created_at: Utc::now(),
        });
        self.undo.push(Undo::Purchase);
        Ok(())
    }

    async fn record_transfer(
        &mut self,
        sender: &Username,
        recipient: &Username,
        amount: i64,
    ) -> Result<()> {
        ensure_positive(amount)?;
        self.tables.ensure_account_exists(sender)?;
        self.tables.ensure_account_exists(recipient)?;

        self.tables.transfers.push(TransferRecord {
            sender: sender.clone(),
            recipient: recipient.clone(),
            amount,
            created_at: Utc::now(),
        });
        self.undo.push(Undo::Transfer);
        Ok(())
    }

    async fn commit(mut self) -> Result<()> {
        self.undo.clear();
        Ok(())
    }

    async fn abort(mut self) -> Result<()> {
        self.rollback();
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Scope = MemoryScope;

    async fn begin(&self) -> Result<MemoryScope> {
        let tables = Arc::clone(&self.tables).lock_owned().await;
        Ok(MemoryScope {
            tables,
            undo: Vec::new(),
        })
    }

    async fn get_account(&self, username: &Username) -> Result<Option<Account>> {
        Ok(self.tables.lock().await.accounts.get(username).cloned())
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Account> {
        let mut tables = self.tables.lock().await;
        if tables.accounts.contains_key(&account.username) {
            return Err(StoreError::AlreadyExists {
                username: account.username.to_string(),
            });
        }
        if account.balance < 0 {
            return Err(StoreError::InsufficientFunds {
                username: account.username.to_string(),
                amount: account.balance,
            });
        }

        let created = Account {
            username: account.username.clone(),
            password_hash: account.password_hash.clone(),
            balance: account.balance,
            created_at: Utc::now(),
        };
        tables
            .accounts
            .insert(created.username.clone(), created.clone());
        Ok(created)
    }

    async fn get_item_price(&self, item: &str) -> Result<Option<i64>> {
        Ok(self.tables.lock().await.catalog.get(item).copied())
    }

    async fn list_inventory(&self, username: &Username) -> Result<Vec<InventoryItem>> {
        let tables = self.tables.lock().await;
        Ok(InventoryItem::tally(
            tables.purchases.iter().filter(|p| &p.username == username),
        ))
    }

    async fn list_received(&self, username: &Username) -> Result<Vec<ReceivedTransfer>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .transfers
            .iter()
            .rev()
            .filter(|t| &t.recipient == username)
            .map(|t| ReceivedTransfer {
                from_user: t.sender.clone(),
                amount: t.amount,
            })
            .collect())
    }

    async fn list_sent(&self, username: &Username) -> Result<Vec<SentTransfer>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .transfers
            .iter()
            .rev()
            .filter(|t| &t.sender == username)
            .map(|t| SentTransfer {
                to_user: t.recipient.clone(),
                amount: t.amount,
            })
            .collect())
    }
}

//! Test helpers for ledger workflows.

use async_trait::async_trait;

use coinshop_core::{
    Account, InventoryItem, NewAccount, ReceivedTransfer, SentTransfer, Username,
};
use coinshop_store::{LedgerScope, MemoryScope, MemoryStore, Result, Store, StoreError};

pub(crate) fn user(name: &str) -> Username {
    Username::new(name).unwrap()
}

/// A memory store holding the given accounts.
pub(crate) async fn seeded(accounts: &[(&str, i64)]) -> MemoryStore {
    let store = MemoryStore::new();
    for (name, balance) in accounts {
        store
            .create_account(&NewAccount {
                username: user(name),
                password_hash: "hash".into(),
                balance: *balance,
            })
            .await
            .unwrap();
    }
    store
}

pub(crate) async fn balance_of(store: &MemoryStore, name: &str) -> i64 {
    store.get_account(&user(name)).await.unwrap().unwrap().balance
}

/// The scope operation a [`FaultyStore`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    Credit,
    RecordPurchase,
    RecordTransfer,
    Commit,
}

/// Wraps a [`MemoryStore`] and fails one scope operation with a storage error.
pub(crate) struct FaultyStore {
    pub(crate) inner: MemoryStore,
    fault: Fault,
}

impl FaultyStore {
    pub(crate) fn new(inner: MemoryStore, fault: Fault) -> Self {
        Self { inner, fault }
    }
}

pub(crate) struct FaultyScope {
    inner: MemoryScope,
    fault: Fault,
}

impl FaultyScope {
    fn check(&self, op: Fault) -> Result<()> {
        if self.fault == op {
            Err(StoreError::Database(format!("injected failure in {op:?}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LedgerScope for FaultyScope {
    async fn find_account(&mut self, username: &Username) -> Result<Option<Account>> {
        self.inner.find_account(username).await
    }

    async fn item_price(&mut self, item: &str) -> Result<Option<i64>> {
        self.inner.item_price(item).await
    }

    async fn debit(&mut self, username: &Username, amount: i64) -> Result<i64> {
        self.inner.debit(username, amount).await
    }

    async fn credit(&mut self, username: &Username, amount: i64) -> Result<i64> {
        self.check(Fault::Credit)?;
        self.inner.credit(username, amount).await
    }

    async fn record_purchase(&mut self, username: &Username, item: &str) -> Result<()> {
        self.check(Fault::RecordPurchase)?;
        self.inner.record_purchase(username, item).await
    }

    async fn record_transfer(
        &mut self,
        sender: &Username,
        recipient: &Username,
        amount: i64,
    ) -> Result<()> {
        self.check(Fault::RecordTransfer)?;
        self.inner.record_transfer(sender, recipient, amount).await
    }

    async fn commit(self) -> Result<()> {
        if self.fault == Fault::Commit {
            self.inner.abort().await?;
            return Err(StoreError::Database("injected commit failure".into()));
        }
        self.inner.commit().await
    }

    async fn abort(self) -> Result<()> {
        self.inner.abort().await
    }
}

#[async_trait]
impl Store for FaultyStore {
    type Scope = FaultyScope;

    async fn begin(&self) -> Result<FaultyScope> {
        Ok(FaultyScope {
            inner: self.inner.begin().await?,
            fault: self.fault,
        })
    }

    async fn get_account(&self, username: &Username) -> Result<Option<Account>> {
        self.inner.get_account(username).await
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Account> {
        self.inner.create_account(account).await
    }

    async fn get_item_price(&self, item: &str) -> Result<Option<i64>> {
        self.inner.get_item_price(item).await
    }

    async fn list_inventory(&self, username: &Username) -> Result<Vec<InventoryItem>> {
        self.inner.list_inventory(username).await
    }

    async fn list_received(&self, username: &Username) -> Result<Vec<ReceivedTransfer>> {
        self.inner.list_received(username).await
    }

    async fn list_sent(&self, username: &Username) -> Result<Vec<SentTransfer>> {
        self.inner.list_sent(username).await
    }
}

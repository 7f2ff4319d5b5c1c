//! PostgreSQL storage implementation.
//!
//! This module provides the `PgStore` implementation of the `Store` trait. Every
//! balance mutation is a single `UPDATE` whose outcome is decided by the database:
//! concurrent debits of the same row serialize on its row lock, and the loser of an
//! overdraft race is rejected by the `users_balance_non_negative` CHECK constraint.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::{PgExecutor, PgPool, Transaction};

use coinshop_core::{Account, InventoryItem, NewAccount, ReceivedTransfer, SentTransfer, Username};

use crate::error::{Result, StoreError};
use crate::schema::constraint;
use crate::{ensure_positive, LedgerScope, Store};

/// How long to wait for a pooled connection before failing the request.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL-backed storage implementation.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database at `url` with a pool of `max_connections`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await?;

        tracing::info!(max_connections, "Connected to PostgreSQL");

        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

/// A PostgreSQL transaction.
///
/// Dropping it without calling `commit` rolls the transaction back.
pub struct PgScope {
    tx: Transaction<'static, Postgres>,
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    username: String,
    hashed_password: String,
    balance: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(Self {
            username: parse_username(row.username)?,
            password_hash: row.hashed_password,
            balance: row.balance,
            created_at: row.created_at,
        })
    }
}

fn parse_username(raw: String) -> Result<Username> {
    Username::new(raw).map_err(|e| StoreError::Database(format!("corrupt username row: {e}")))
}

/// Translate a failed balance `UPDATE` into a domain error.
fn balance_update_error(err: sqlx::Error, username: &Username, amount: i64) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_check_violation() && db_err.constraint() == Some(constraint::BALANCE_NON_NEGATIVE)
        {
            return StoreError::InsufficientFunds {
                username: username.to_string(),
                amount,
            };
        }
    }
    StoreError::from(err)
}

/// Translate a failed account `INSERT` into a domain error.
fn insert_account_error(err: sqlx::Error, username: &Username) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(constraint::USERS_PKEY) {
            return StoreError::AlreadyExists {
                username: username.to_string(),
            };
        }
    }
    StoreError::from(err)
}

fn account_not_found(username: &Username) -> StoreError {
    StoreError::NotFound {
        entity: "account",
        id: username.to_string(),
    }
}

// =============================================================================
// Queries
// =============================================================================

async fn fetch_account<'e>(
    executor: impl PgExecutor<'e>,
    username: &Username,
) -> Result<Option<Account>> {
    sqlx::query_as::<_, AccountRow>(
        "SELECT username, hashed_password, balance, created_at FROM users WHERE username = $1",
    )
    .bind(username.as_str())
    .fetch_optional(executor)
    .await?
    .map(Account::try_from)
    .transpose()
}

async fn fetch_item_price<'e>(executor: impl PgExecutor<'e>, item: &str) -> Result<Option<i64>> {
    let price = sqlx::query_scalar::<_, i64>("SELECT price FROM merch WHERE name = $1")
        .bind(item)
        .fetch_optional(executor)
        .await?;
    Ok(price)
}

#[async_trait]
impl LedgerScope for PgScope {
    async fn find_account(&mut self, username: &Username) -> Result<Option<Account>> {
        fetch_account(&mut *self.tx, username).await
    }

    async fn item_price(&mut self, item: &str) -> Result<Option<i64>> {
        fetch_item_price(&mut *self.tx, item).await
    }

    async fn debit(&mut self, username: &Username, amount: i64) -> Result<i64> {
        ensure_positive(amount)?;

        sqlx::query_scalar::<_, i64>(
            "UPDATE users SET balance = balance - $1 WHERE username = $2 RETURNING balance",
        )
        .bind(amount)
        .bind(username.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| balance_update_error(e, username, amount))?
        .ok_or_else(|| account_not_found(username))
    }

    async fn credit(&mut self, username: &Username, amount: i64) -> Result<i64> {
        ensure_positive(amount)?;

        sqlx::query_scalar::<_, i64>(
            "UPDATE users SET balance = balance + $1 WHERE username = $2 RETURNING balance",
        )
        .bind(amount)
        .bind(username.as_str())
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| account_not_found(username))
    }

    async fn record_purchase(&mut self, username: &Username, item: &str) -> Result<()> {
        sqlx::query("INSERT INTO purchases (username, merch_item) VALUES ($1, $2)")
            .bind(username.as_str())
            .bind(item)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn record_transfer(
        &mut self,
        sender: &Username,
        recipient: &Username,
        amount: i64,
    ) -> Result<()> {
        ensure_positive(amount)?;

        sqlx::query("INSERT INTO transfers (sender, recipient, amount) VALUES ($1, $2, $3)")
            .bind(sender.as_str())
            .bind(recipient.as_str())
            .bind(amount)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn abort(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    type Scope = PgScope;

    async fn begin(&self) -> Result<PgScope> {
        let tx = self.pool.begin().await?;
        Ok(PgScope { tx })
    }

    async fn get_account(&self, username: &Username) -> Result<Option<Account>> {
        fetch_account(&self.pool, username).await
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            "INSERT INTO users (username, hashed_password, balance) VALUES ($1, $2, $3) \
             RETURNING username, hashed_password, balance, created_at",
        )
        .bind(account.username.as_str())
        .bind(&account.password_hash)
        .bind(account.balance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_account_error(e, &account.username))?;

        Account::try_from(row)
    }

    async fn get_item_price(&self, item: &str) -> Result<Option<i64>> {
        fetch_item_price(&self.pool, item).await
    }

    async fn list_inventory(&self, username: &Username) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT merch_item, COUNT(*) FROM purchases WHERE username = $1 \
             GROUP BY merch_item ORDER BY merch_item",
        )
        .bind(username.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(item_name, quantity)| InventoryItem {
                item_name,
                quantity,
            })
            .collect())
    }

    async fn list_received(&self, username: &Username) -> Result<Vec<ReceivedTransfer>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT sender, amount FROM transfers WHERE recipient = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(username.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(sender, amount)| {
                Ok(ReceivedTransfer {
                    from_user: parse_username(sender)?,
                    amount,
                })
            })
            .collect()
    }

    async fn list_sent(&self, username: &Username) -> Result<Vec<SentTransfer>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT recipient, amount FROM transfers WHERE sender = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(username.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(recipient, amount)| {
                Ok(SentTransfer {
                    to_user: parse_username(recipient)?,
                    amount,
                })
            })
            .collect()
    }
}

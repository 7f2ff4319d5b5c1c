//! Account provisioning.

use coinshop_core::{Account, NewAccount, Result, Username};
use coinshop_store::Store;

/// Return the account for `username`, creating it with the starting balance if absent.
///
/// Creation is its own atomic unit. When two callers provision the same new username
/// concurrently, the store's unique key lets exactly one insert win; the other gets
/// `ShopError::AccountAlreadyExists`. The starting balance is therefore credited once.
///
/// # Errors
///
/// - `ShopError::AccountAlreadyExists` if a concurrent caller created the account first.
/// - `ShopError::Storage` on storage failure.
pub async fn provision<S: Store>(
    store: &S,
    username: &Username,
    password_hash: String,
) -> Result<Account> {
    if let Some(account) = store.get_account(username).await? {
        return Ok(account);
    }

    let account = store
        .create_account(&NewAccount::with_starting_balance(
            username.clone(),
            password_hash,
        ))
        .await?;

    tracing::info!(username = %username, balance = account.balance, "Account created");

    Ok(account)
}

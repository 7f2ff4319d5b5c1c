//! Account read model.

use coinshop_core::{AccountSummary, CoinHistory, Result, ShopError, Username};
use coinshop_store::Store;

/// Balance, inventory and transfer history for `username`.
///
/// The four reads run concurrently outside any scope, so they are not a single
/// snapshot: a transfer committing in between may show in the history but not yet
/// in the balance.
///
/// # Errors
///
/// - `ShopError::AccountNotFound` if the account does not exist.
/// - `ShopError::Storage` on storage failure.
pub async fn account_summary<S: Store>(store: &S, username: &Username) -> Result<AccountSummary> {
    let (account, inventory, received, sent) = futures::try_join!(
        store.get_account(username),
        store.list_inventory(username),
        store.list_received(username),
        store.list_sent(username),
    )?;

    let account = account.ok_or_else(|| ShopError::AccountNotFound {
        username: username.to_string(),
    })?;

    Ok(AccountSummary {
        coins: account.balance,
        inventory,
        coin_history: CoinHistory { received, sent },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::{seeded, user};
    use crate::ledger::{purchase, transfer};

    #[tokio::test]
    async fn new_account_has_empty_summary() {
        let store = seeded(&[("alice", 1000)]).await;

        let summary = account_summary(&store, &user("alice")).await.unwrap();
        assert_eq!(summary.coins, 1000);
        assert!(summary.inventory.is_empty());
        assert!(summary.coin_history.received.is_empty());
        assert!(summary.coin_history.sent.is_empty());
    }

    #[tokio::test]
    async fn summary_reflects_activity() {
        let store = seeded(&[("alice", 1000), ("bob", 1000)]).await;
        purchase(&store, &user("alice"), "t-shirt").await.unwrap();
        purchase(&store, &user("alice"), "cup").await.unwrap();
        purchase(&store, &user("alice"), "cup").await.unwrap();
        transfer(&store, &user("alice"), "bob", 100).await.unwrap();
        transfer(&store, &user("bob"), "alice", 30).await.unwrap();

        let summary = account_summary(&store, &user("alice")).await.unwrap();
        assert_eq!(summary.coins, 1000 - 80 - 40 - 100 + 30);

        let inventory: Vec<_> = summary
            .inventory
            .iter()
            .map(|i| (i.item_name.as_str(), i.quantity))
            .collect();
        assert_eq!(inventory, vec![("cup", 2), ("t-shirt", 1)]);

        assert_eq!(summary.coin_history.sent.len(), 1);
        assert_eq!(summary.coin_history.sent[0].to_user, user("bob"));
        assert_eq!(summary.coin_history.received.len(), 1);
        assert_eq!(summary.coin_history.received[0].amount, 30);
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let store = seeded(&[]).await;

        let result = account_summary(&store, &user("ghost")).await;
        assert!(matches!(result, Err(ShopError::AccountNotFound { .. })));
    }
}

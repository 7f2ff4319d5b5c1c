//! Purchase workflow.

use serde::Serialize;

use coinshop_core::{Result, ShopError, Username};
use coinshop_store::{LedgerScope, Store};

/// Outcome of a committed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    /// The item bought.
    pub item: String,
    /// Coins paid.
    pub price: i64,
    /// Buyer's balance after the purchase.
    pub balance: i64,
}

/// Buy one unit of `item` for `buyer`.
///
/// Within one scope: look up the price, debit the buyer, record the purchase, commit.
///
/// # Errors
///
/// - `ShopError::InvalidInput` if `item` is empty.
/// - `ShopError::UnknownItem` if the item is not in the catalog.
/// - `ShopError::InsufficientFunds` if the balance does not cover the price.
/// - `ShopError::Storage` on storage failure.
///
/// Nothing is changed on any error.
pub async fn purchase<S: Store>(store: &S, buyer: &Username, item: &str) -> Result<PurchaseReceipt> {
    if item.is_empty() {
        return Err(ShopError::InvalidInput("item name is required".into()));
    }

    let mut scope = store.begin().await?;

    let Some(price) = scope.item_price(item).await? else {
        tracing::debug!(username = %buyer, item, "Unknown item");
        return Err(ShopError::UnknownItem {
            item: item.to_string(),
        });
    };

    let balance = match scope.debit(buyer, price).await {
        Ok(balance) => balance,
        Err(e) => {
            if let Err(abort_err) = scope.abort().await {
                tracing::warn!(error = %abort_err, "Failed to abort purchase scope");
            }
            let err = ShopError::from(e);
            tracing::info!(username = %buyer, item, price, error = %err, "Purchase rejected");
            return Err(err);
        }
    };
    scope.record_purchase(buyer, item).await?;
    scope.commit().await?;

    tracing::info!(username = %buyer, item, price, balance, "Purchase committed");

    Ok(PurchaseReceipt {
        item: item.to_string(),
        price,
        balance,
    })
}

//! Transfer workflow.

use serde::Serialize;

use coinshop_core::{Result, ShopError, Username};
use coinshop_store::{LedgerScope, Store};

/// Outcome of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    /// Who received the coins.
    pub recipient: Username,
    /// Coins moved.
    pub amount: i64,
    /// Sender's balance after the transfer.
    pub balance: i64,
}

/// Move `amount` coins from `sender` to `recipient`.
///
/// Within one scope: check the recipient exists, debit the sender, credit the
/// recipient, record the transfer, commit. The two balance updates are applied in
/// username order so that opposing transfers lock rows in the same order.
///
/// # Errors
///
/// - `ShopError::InvalidAmount` if `amount <= 0`.
/// - `ShopError::InvalidRecipient` if `recipient` is empty, malformed or the sender.
/// - `ShopError::UnknownRecipient` if no such account exists.
/// - `ShopError::InsufficientFunds` if the sender's balance does not cover `amount`.
/// - `ShopError::Storage` on storage failure.
///
/// Nothing is changed on any error.
pub async fn transfer<S: Store>(
    store: &S,
    sender: &Username,
    recipient: &str,
    amount: i64,
) -> Result<TransferReceipt> {
    if amount <= 0 {
        return Err(ShopError::InvalidAmount { amount });
    }
    if recipient.is_empty() {
        return Err(ShopError::InvalidRecipient("recipient is required".into()));
    }
    let recipient =
        Username::new(recipient).map_err(|e| ShopError::InvalidRecipient(e.to_string()))?;
    if &recipient == sender {
        return Err(ShopError::InvalidRecipient(
            "cannot send coins to yourself".into(),
        ));
    }

    let mut scope = store.begin().await?;

    if scope.find_account(&recipient).await?.is_none() {
        tracing::debug!(sender = %sender, recipient = %recipient, "Unknown recipient");
        return Err(ShopError::UnknownRecipient {
            username: recipient.to_string(),
        });
    }

    let moved = if sender < &recipient {
        match scope.debit(sender, amount).await {
            Ok(balance) => scope.credit(&recipient, amount).await.map(|_| balance),
            Err(e) => Err(e),
        }
    } else {
        match scope.credit(&recipient, amount).await {
            Ok(_) => scope.debit(sender, amount).await,
            Err(e) => Err(e),
        }
    };
    let balance = match moved {
        Ok(balance) => balance,
        Err(e) => {
            if let Err(abort_err) = scope.abort().await {
                tracing::warn!(error = %abort_err, "Failed to abort transfer scope");
            }
            let err = ShopError::from(e);
            tracing::info!(
                sender = %sender,
                recipient = %recipient,
                amount,
                error = %err,
                "Transfer rejected"
            );
            return Err(err);
        }
    };

    scope.record_transfer(sender, &recipient, amount).await?;
    scope.commit().await?;

    tracing::info!(
        sender = %sender,
        recipient = %recipient,
        amount,
        balance,
        "Transfer committed"
    );

    Ok(TransferReceipt {
        recipient,
        amount,
        balance,
    })
}

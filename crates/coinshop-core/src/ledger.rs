//! Ledger facts and the account read model.
//!
//! Purchases and transfers are append-only facts. Inventory and coin history are
//! derived from them on read; nothing derived is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Username;

/// One unit of an item bought by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// The buyer.
    pub username: Username,
    /// The catalog item name.
    pub item_name: String,
    /// When the purchase committed.
    pub created_at: DateTime<Utc>,
}

/// One coin movement between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Debited account.
    pub sender: Username,
    /// Credited account.
    pub recipient: Username,
    /// Coins moved (always positive).
    pub amount: i64,
    /// When the transfer committed.
    pub created_at: DateTime<Utc>,
}

/// Quantity of one item owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Item name.
    #[serde(rename = "type")]
    pub item_name: String,
    /// Number of purchase records for this item.
    pub quantity: i64,
}

/// A transfer as seen by its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedTransfer {
    /// Who sent the coins.
    pub from_user: Username,
    /// Coins received.
    pub amount: i64,
}

/// A transfer as seen by its sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentTransfer {
    /// Who received the coins.
    pub to_user: Username,
    /// Coins sent.
    pub amount: i64,
}

/// Both sides of an account's transfer history, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    /// Transfers into the account.
    pub received: Vec<ReceivedTransfer>,
    /// Transfers out of the account.
    pub sent: Vec<SentTransfer>,
}

/// Balance, inventory and history of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    /// Current balance.
    pub coins: i64,
    /// Items bought, grouped by name.
    pub inventory: Vec<InventoryItem>,
    /// Transfer history.
    pub coin_history: CoinHistory,
}

impl InventoryItem {
    /// Group purchase records into per-item quantities, sorted by item name.
    #[must_use]
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a PurchaseRecord>) -> Vec<Self> {
        let mut counts = std::collections::BTreeMap::<&str, i64>::new();
        for record in records {
            *counts.entry(record.item_name.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(item_name, quantity)| Self {
                item_name: item_name.to_string(),
                quantity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(item: &str) -> PurchaseRecord {
        PurchaseRecord {
            username: Username::new("alice").unwrap(),
            item_name: item.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn tally_groups_by_item() {
        let records = vec![purchase("cup"), purchase("t-shirt"), purchase("cup")];
        let inventory = InventoryItem::tally(&records);

        assert_eq!(
            inventory,
            vec![
                InventoryItem {
                    item_name: "cup".into(),
                    quantity: 2
                },
                InventoryItem {
                    item_name: "t-shirt".into(),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn tally_of_nothing_is_empty() {
        assert!(InventoryItem::tally(&Vec::<PurchaseRecord>::new()).is_empty());
    }

    #[test]
    fn summary_uses_wire_field_names() {
        let summary = AccountSummary {
            coins: 900,
            inventory: vec![InventoryItem {
                item_name: "pen".into(),
                quantity: 1,
            }],
            coin_history: CoinHistory {
                received: vec![ReceivedTransfer {
                    from_user: Username::new("bob").unwrap(),
                    amount: 5,
                }],
                sent: vec![SentTransfer {
                    to_user: Username::new("carol").unwrap(),
                    amount: 100,
                }],
            },
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["coins"], 900);
        assert_eq!(json["inventory"][0]["type"], "pen");
        assert_eq!(json["inventory"][0]["quantity"], 1);
        assert_eq!(json["coinHistory"]["received"][0]["fromUser"], "bob");
        assert_eq!(json["coinHistory"]["sent"][0]["toUser"], "carol");
        assert_eq!(json["coinHistory"]["sent"][0]["amount"], 100);
    }
}

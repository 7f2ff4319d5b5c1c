//! Property tests for ledger invariants.
//!
//! Random sequences of purchases and transfers over a small population must never
//! create or destroy coins, and must never leave a balance negative.

use proptest::prelude::*;

use coinshop_core::{default_catalog, NewAccount, ShopError, Username};
use coinshop_service::ledger;
use coinshop_store::{MemoryStore, Store};

const USERS: [&str; 4] = ["alice", "bob", "carol", "dave"];
const START: i64 = 1000;

#[derive(Debug, Clone)]
enum Op {
    Buy { user: usize, item: usize },
    Send { from: usize, to: usize, amount: i64 },
}

fn op() -> impl Strategy<Value = Op> {
    let items = default_catalog().len();
    prop_oneof![
        (0..USERS.len(), 0..items).prop_map(|(user, item)| Op::Buy { user, item }),
        (0..USERS.len(), 0..USERS.len(), -10i64..600).prop_map(|(from, to, amount)| Op::Send {
            from,
            to,
            amount
        }),
    ]
}

fn user(i: usize) -> Username {
    Username::new(USERS[i]).unwrap()
}

async fn spent_on_items(store: &MemoryStore) -> i64 {
    let prices = default_catalog();
    let mut total = 0;
    for i in 0..USERS.len() {
        for entry in store.list_inventory(&user(i)).await.unwrap() {
            let price = prices
                .iter()
                .find(|item| item.name == entry.item_name)
                .unwrap()
                .price;
            total += price * entry.quantity;
        }
    }
    total
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn coins_are_conserved(ops in prop::collection::vec(op(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let store = MemoryStore::new();
            for i in 0..USERS.len() {
                store
                    .create_account(&NewAccount {
                        username: user(i),
                        password_hash: "hash".into(),
                        balance: START,
                    })
                    .await
                    .unwrap();
            }
            let catalog = default_catalog();

            for op in ops {
                let before = store.total_balance().await + spent_on_items(&store).await;

                let result = match &op {
                    Op::Buy { user: u, item } => {
                        ledger::purchase(&store, &user(*u), &catalog[*item].name)
                            .await
                            .map(|_| ())
                    }
                    Op::Send { from, to, amount } => {
                        ledger::transfer(&store, &user(*from), USERS[*to], *amount)
                            .await
                            .map(|_| ())
                    }
                };

                if let Err(e) = &result {
                    assert!(
                        matches!(
                            e,
                            ShopError::InsufficientFunds { .. }
                                | ShopError::InvalidAmount { .. }
                                | ShopError::InvalidRecipient(_)
                        ),
                        "unexpected error for {op:?}: {e}"
                    );
                }

                let after = store.total_balance().await + spent_on_items(&store).await;
                assert_eq!(before, after, "coins changed by {op:?}");

                for i in 0..USERS.len() {
                    let balance = store.get_account(&user(i)).await.unwrap().unwrap().balance;
                    assert!(balance >= 0, "{} went negative after {op:?}", USERS[i]);
                }
            }

            assert_eq!(
                store.total_balance().await + spent_on_items(&store).await,
                START * USERS.len() as i64
            );
        });
    }
}

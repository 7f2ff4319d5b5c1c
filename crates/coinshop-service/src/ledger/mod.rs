//! Ledger workflows.
//!
//! Each workflow composes store primitives inside a single [`LedgerScope`]: every
//! mutation it makes commits together or not at all. Validation that needs no storage
//! happens before the scope is opened. Any error after that returns early with `?`,
//! which drops the scope and rolls it back.
//!
//! Workflows never retry. A [`ShopError::Storage`] is safe for the caller to retry
//! unchanged; every other error is final for the given inputs.
//!
//! [`LedgerScope`]: coinshop_store::LedgerScope
//! [`ShopError::Storage`]: coinshop_core::ShopError::Storage

mod provision;
mod purchase;
mod summary;
mod transfer;

pub use provision::provision;
pub use purchase::{purchase, PurchaseReceipt};
pub use summary::account_summary;
pub use transfer::{transfer, TransferReceipt};

#[cfg(test)]
pub(crate) mod testing;

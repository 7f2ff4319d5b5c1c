//! Core types and utilities for coinshop.
//!
//! This crate provides the foundational types shared by the store and the HTTP service:
//!
//! - **Identifiers**: `Username`
//! - **Accounts**: `Account`, `NewAccount`
//! - **Ledger facts**: `PurchaseRecord`, `TransferRecord`
//! - **Catalog**: `CatalogItem`, `default_catalog`
//! - **Read models**: `AccountSummary`, `InventoryItem`, `CoinHistory`
//! - **Errors**: `ShopError`
//!
//! # Coins
//!
//! Balances and prices are whole coins stored as `i64`. Every account starts with
//! [`STARTING_BALANCE`] coins; after that, coins only move between accounts (transfers)
//! or leave the system (purchases).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod ledger;

pub use account::{Account, NewAccount, STARTING_BALANCE};
pub use catalog::{default_catalog, CatalogItem};
pub use error::{Result, ShopError};
pub use ids::{IdError, Username, MAX_USERNAME_LEN};
pub use ledger::{
    AccountSummary, CoinHistory, InventoryItem, PurchaseRecord, ReceivedTransfer, SentTransfer,
    TransferRecord,
};

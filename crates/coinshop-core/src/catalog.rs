//! The merchandise catalog.
//!
//! The catalog is static reference data: the PostgreSQL migration seeds the same list
//! into the `merch` table and the in-memory store loads it from [`default_catalog`].
//! Nothing in the ledger core ever writes to it.

use serde::{Deserialize, Serialize};

/// A purchasable item and its price in coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Item name, also the path segment used by `/api/buy/{item}`.
    pub name: String,
    /// Price in coins (always positive).
    pub price: i64,
}

impl CatalogItem {
    fn new(name: &str, price: i64) -> Self {
        Self {
            name: name.to_string(),
            price,
        }
    }
}

/// The merchandise sold by the store.
#[must_use]
pub fn default_catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new("t-shirt", 80),
        CatalogItem::new("cup", 20),
        CatalogItem::new("book", 50),
        CatalogItem::new("pen", 10),
        CatalogItem::new("powerbank", 200),
        CatalogItem::new("hoody", 300),
        CatalogItem::new("umbrella", 200),
        CatalogItem::new("socks", 10),
        CatalogItem::new("wallet", 50),
        CatalogItem::new("pink-hoody", 500),
    ]
}

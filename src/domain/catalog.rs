//! Merch catalog
//!
//! Immutable SKU → price mapping. Built once at startup and shared read-only
//! (behind an `Arc`) by every handler.

use std::collections::HashMap;
use std::str::FromStr;

use super::amount::{Amount, AmountError};

/// Items sold when no override is configured.
const DEFAULT_ITEMS: &[(&str, i64)] = &[
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

/// Read-only merch catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    items: HashMap<String, Amount>,
}

/// Errors raised while building a catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog is empty")]
    Empty,

    #[error("Malformed catalog entry: '{0}' (expected sku=price)")]
    MalformedEntry(String),

    #[error("Invalid price for '{sku}': {source}")]
    InvalidPrice { sku: String, source: AmountError },

    #[error("Duplicate SKU in catalog: {0}")]
    DuplicateSku(String),
}

impl Catalog {
    /// Build a catalog from (sku, price) pairs.
    pub fn new<I, S>(items: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut map = HashMap::new();
        for (sku, price) in items {
            let sku = sku.into();
            let price = Amount::new(price).map_err(|source| CatalogError::InvalidPrice {
                sku: sku.clone(),
                source,
            })?;
            if map.insert(sku.clone(), price).is_some() {
                return Err(CatalogError::DuplicateSku(sku));
            }
        }

        if map.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self { items: map })
    }

    /// Price of `sku`, if the shop sells it
    pub fn price_of(&self, sku: &str) -> Option<Amount> {
        self.items.get(sku).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Amount)> {
        self.items.iter().map(|(sku, price)| (sku.as_str(), *price))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            items: DEFAULT_ITEMS
                .iter()
                .map(|(sku, price)| ((*sku).to_string(), Amount::from_unchecked(*price)))
                .collect(),
        }
    }
}

/// Parses `sku=price,sku=price` (whitespace around entries is ignored).
impl FromStr for Catalog {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut items = Vec::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (sku, price) = entry
                .split_once('=')
                .ok_or_else(|| CatalogError::MalformedEntry(entry.to_string()))?;
            let sku = sku.trim();
            if sku.is_empty() {
                return Err(CatalogError::MalformedEntry(entry.to_string()));
            }
            let price: i64 = price
                .trim()
                .parse()
                .map_err(|_| CatalogError::MalformedEntry(entry.to_string()))?;
            items.push((sku.to_string(), price));
        }
        Catalog::new(items)
    }
}

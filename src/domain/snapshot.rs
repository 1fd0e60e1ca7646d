//! Account read model
//!
//! Types assembled per request by the info handler. Nothing here is persisted.
//! Field names follow the public JSON contract (`coinHistory`, `fromUser`, ...).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amount::{Amount, Balance};

/// Resolved account identity and current balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub balance: Balance,
}

/// One owned merch item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(rename = "type")]
    pub sku: String,
    pub quantity: i64,
}

/// Transfer as seen by its recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedTransfer {
    pub from_user: String,
    pub amount: Amount,
}

/// Transfer as seen by its sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentTransfer {
    pub to_user: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    pub received: Vec<ReceivedTransfer>,
    pub sent: Vec<SentTransfer>,
}

/// Full account state: balance, inventory and transfer history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub coins: Balance,
    pub inventory: Vec<InventoryItem>,
    pub coin_history: CoinHistory,
}

impl AccountSnapshot {
    pub fn new(
        coins: Balance,
        inventory: Vec<InventoryItem>,
        sent: Vec<SentTransfer>,
        received: Vec<ReceivedTransfer>,
    ) -> Self {
        Self {
            coins,
            inventory,
            coin_history: CoinHistory { received, sent },
        }
    }
}

//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};

// =========================================================================
// SendCoinCommand
// =========================================================================

/// Command to move coins from one user to another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCoinCommand {
    /// Authenticated sender
    pub from_username: String,
    /// Recipient username
    pub to_username: String,
    /// Raw amount; validated by the handler
    pub amount: i64,
}

impl SendCoinCommand {
    pub fn new(from_username: impl Into<String>, to_username: impl Into<String>, amount: i64) -> Self {
        Self {
            from_username: from_username.into(),
            to_username: to_username.into(),
            amount,
        }
    }
}

// =========================================================================
// BuyItemCommand
// =========================================================================

/// Command to buy one catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyItemCommand {
    pub username: String,
    pub item: String,
}

impl BuyItemCommand {
    pub fn new(username: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            item: item.into(),
        }
    }
}

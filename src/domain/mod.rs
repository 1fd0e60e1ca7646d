//! Domain module
//!
//! Core domain types and business rules.

pub mod amount;
pub mod catalog;
pub mod context;
pub mod error;
pub mod snapshot;

pub use amount::{Amount, AmountError, Balance};
pub use catalog::{Catalog, CatalogError};
pub use context::OperationContext;
pub use error::DomainError;
pub use snapshot::{
    Account, AccountSnapshot, CoinHistory, InventoryItem, ReceivedTransfer, SentTransfer,
};

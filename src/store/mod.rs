//! Account Store module
//!
//! Persistence seam for balances, inventory and transfer history.
//! Everything that must be atomic across rows lives behind this trait.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, Amount, Balance, InventoryItem, ReceivedTransfer, SentTransfer};

pub use error::StoreError;
pub use memory::InMemoryAccountStore;
pub use postgres::PgAccountStore;

/// Storage contract required by the shop handlers.
///
/// ## Atomicity
///
/// `atomic_transfer` and `atomic_purchase` each run as one indivisible unit:
/// the balance check and the debit happen in the same conditional write, and
/// either every effect commits or none does. Implementations must not split
/// them into a read followed by a separate write.
///
/// ## Concurrency
///
/// Calls touching disjoint accounts must be able to proceed in parallel.
/// Calls touching the same account serialize inside the store, never in the
/// caller.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up id and balance by username
    async fn resolve_account(&self, username: &str) -> Result<Option<Account>, StoreError>;

    async fn list_inventory(&self, account_id: Uuid) -> Result<Vec<InventoryItem>, StoreError>;

    /// Transfers sent by the account, in insertion order
    async fn list_sent_transfers(&self, account_id: Uuid) -> Result<Vec<SentTransfer>, StoreError>;

    /// Transfers received by the account, in insertion order
    async fn list_received_transfers(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<ReceivedTransfer>, StoreError>;

    /// Check, debit `from`, credit `to` and record the transfer as one unit.
    ///
    /// Returns `StoreError::InsufficientFunds` when `from` cannot cover
    /// `amount`, and `StoreError::SameAccount` when `from == to`; nothing is
    /// written in either case.
    async fn atomic_transfer(&self, from: &str, to: &str, amount: Amount) -> Result<(), StoreError>;

    /// Check, debit `price` and add one `sku` to the inventory as one unit.
    async fn atomic_purchase(
        &self,
        username: &str,
        sku: &str,
        price: Amount,
    ) -> Result<(), StoreError>;

    /// Stored password hash for login
    async fn find_password_hash(&self, username: &str) -> Result<Option<String>, StoreError>;

    /// Register a new account. Returns false if the username is already taken.
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        initial_balance: Balance,
    ) -> Result<bool, StoreError>;
}

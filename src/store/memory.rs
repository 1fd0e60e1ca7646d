//! In-memory Account Store
//!
//! Intended for tests and local runs. Mutations take the write lock for their
//! whole check-and-apply step, which gives the same all-or-nothing behavior
//! as the Postgres transaction.
//!
//! The single lock serializes every mutation, so transfers between unrelated
//! accounts wait on each other here. Use [`PgAccountStore`](super::PgAccountStore)
//! where disjoint operations must run in parallel.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, Amount, Balance, InventoryItem, ReceivedTransfer, SentTransfer};

use super::{AccountStore, StoreError};

#[derive(Debug, Clone)]
struct AccountRow {
    id: Uuid,
    password_hash: String,
    balance: Balance,
}

#[derive(Debug, Clone)]
struct TransferRow {
    from_id: Uuid,
    to_id: Uuid,
    amount: Amount,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, AccountRow>,
    usernames: HashMap<Uuid, String>,
    transfers: Vec<TransferRow>,
    inventory: BTreeMap<(Uuid, String), i64>,
}

impl State {
    fn username_of(&self, id: Uuid) -> Result<String, StoreError> {
        self.usernames
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::InvalidData(format!("dangling account id {id}")))
    }
}

/// In-memory account store.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    state: RwLock<State>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    /// Seed an account with a balance and no password. Returns its id, or
    /// `None` if the username already exists.
    pub fn insert_account(&self, username: &str, balance: Balance) -> Option<Uuid> {
        let mut state = self.write().ok()?;
        if state.accounts.contains_key(username) {
            return None;
        }
        let id = Uuid::new_v4();
        state.accounts.insert(
            username.to_string(),
            AccountRow {
                id,
                password_hash: String::new(),
                balance,
            },
        );
        state.usernames.insert(id, username.to_string());
        Some(id)
    }

    /// Sum of all balances; constant under transfers
    pub fn total_coins(&self) -> i64 {
        self.read()
            .map(|state| state.accounts.values().map(|a| a.balance.value()).sum())
            .unwrap_or(0)
    }

    pub fn transfer_count(&self) -> usize {
        self.read().map(|state| state.transfers.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn resolve_account(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let state = self.read()?;
        Ok(state.accounts.get(username).map(|row| Account {
            id: row.id,
            username: username.to_string(),
            balance: row.balance,
        }))
    }

    async fn list_inventory(&self, account_id: Uuid) -> Result<Vec<InventoryItem>, StoreError> {
        let state = self.read()?;
        Ok(state
            .inventory
            .iter()
            .filter(|((owner, _), quantity)| *owner == account_id && **quantity > 0)
            .map(|((_, sku), quantity)| InventoryItem {
                sku: sku.clone(),
                quantity: *quantity,
            })
            .collect())
    }

    async fn list_sent_transfers(&self, account_id: Uuid) -> Result<Vec<SentTransfer>, StoreError> {
        let state = self.read()?;
        state
            .transfers
            .iter()
            .filter(|t| t.from_id == account_id)
            .map(|t| {
                Ok(SentTransfer {
                    to_user: state.username_of(t.to_id)?,
                    amount: t.amount,
                })
            })
            .collect()
    }

    async fn list_received_transfers(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<ReceivedTransfer>, StoreError> {
        let state = self.read()?;
        state
            .transfers
            .iter()
            .filter(|t| t.to_id == account_id)
            .map(|t| {
                Ok(ReceivedTransfer {
                    from_user: state.username_of(t.from_id)?,
                    amount: t.amount,
                })
            })
            .collect()
    }

    async fn atomic_transfer(&self, from: &str, to: &str, amount: Amount) -> Result<(), StoreError> {
        // Debit and credit would both start from the same balance.
        if from == to {
            return Err(StoreError::SameAccount(from.to_string()));
        }

        let mut state = self.write()?;

        let sender = state
            .accounts
            .get(from)
            .ok_or_else(|| StoreError::AccountNotFound(from.to_string()))?;
        let recipient = state
            .accounts
            .get(to)
            .ok_or_else(|| StoreError::AccountNotFound(to.to_string()))?;

        // Compute both new balances before writing anything.
        let sender_balance = sender
            .balance
            .debit(amount)
            .map_err(|_| StoreError::InsufficientFunds)?;
        let recipient_balance = recipient
            .balance
            .credit(amount)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let (from_id, to_id) = (sender.id, recipient.id);

        if let Some(row) = state.accounts.get_mut(from) {
            row.balance = sender_balance;
        }
        if let Some(row) = state.accounts.get_mut(to) {
            row.balance = recipient_balance;
        }
        state.transfers.push(TransferRow {
            from_id,
            to_id,
            amount,
        });

        Ok(())
    }

    async fn atomic_purchase(
        &self,
        username: &str,
        sku: &str,
        price: Amount,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;

        let row = state
            .accounts
            .get_mut(username)
            .ok_or_else(|| StoreError::AccountNotFound(username.to_string()))?;
        row.balance = row
            .balance
            .debit(price)
            .map_err(|_| StoreError::InsufficientFunds)?;
        let id = row.id;

        *state.inventory.entry((id, sku.to_string())).or_insert(0) += 1;

        Ok(())
    }

    async fn find_password_hash(&self, username: &str) -> Result<Option<String>, StoreError> {
        let state = self.read()?;
        Ok(state
            .accounts
            .get(username)
            .map(|row| row.password_hash.clone()))
    }

    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        initial_balance: Balance,
    ) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        if state.accounts.contains_key(username) {
            return Ok(false);
        }

        let id = Uuid::new_v4();
        state.accounts.insert(
            username.to_string(),
            AccountRow {
                id,
                password_hash: password_hash.to_string(),
                balance: initial_balance,
            },
        );
        state.usernames.insert(id, username.to_string());

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(value: i64) -> Amount {
        Amount::new(value).unwrap()
    }

    fn store_with(accounts: &[(&str, i64)]) -> InMemoryAccountStore {
        let store = InMemoryAccountStore::new();
        for (name, coins) in accounts {
            store
                .insert_account(name, Balance::new(*coins).unwrap())
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_transfer_moves_exact_amount() {
        let store = store_with(&[("alice", 100), ("bob", 10)]);

        store.atomic_transfer("alice", "bob", amount(60)).await.unwrap();

        let alice = store.resolve_account("alice").await.unwrap().unwrap();
        let bob = store.resolve_account("bob").await.unwrap().unwrap();
        assert_eq!(alice.balance.value(), 40);
        assert_eq!(bob.balance.value(), 70);
        assert_eq!(store.total_coins(), 110);

        let sent = store.list_sent_transfers(alice.id).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_user, "bob");

        let received = store.list_received_transfers(bob.id).await.unwrap();
        assert_eq!(received[0].from_user, "alice");
        assert_eq!(received[0].amount.value(), 60);
    }

    #[tokio::test]
    async fn test_overdraft_leaves_no_trace() {
        let store = store_with(&[("alice", 100), ("bob", 0)]);

        let result = store.atomic_transfer("alice", "bob", amount(150)).await;
        assert!(matches!(result, Err(StoreError::InsufficientFunds)));

        assert_eq!(store.total_coins(), 100);
        assert_eq!(store.transfer_count(), 0);
    }

    #[tokio::test]
    async fn test_transfer_to_self_rejected() {
        let store = store_with(&[("alice", 100)]);

        let result = store.atomic_transfer("alice", "alice", amount(60)).await;
        assert!(matches!(result, Err(StoreError::SameAccount(_))));

        assert_eq!(store.total_coins(), 100);
        assert_eq!(store.transfer_count(), 0);
    }

    #[tokio::test]
    async fn test_purchase_upserts_inventory() {
        let store = store_with(&[("alice", 100)]);

        store.atomic_purchase("alice", "cup", amount(20)).await.unwrap();
        store.atomic_purchase("alice", "cup", amount(20)).await.unwrap();

        let alice = store.resolve_account("alice").await.unwrap().unwrap();
        assert_eq!(alice.balance.value(), 60);

        let inventory = store.list_inventory(alice.id).await.unwrap();
        assert_eq!(
            inventory,
            vec![InventoryItem {
                sku: "cup".to_string(),
                quantity: 2
            }]
        );
    }

    #[tokio::test]
    async fn test_purchase_insufficient_funds() {
        let store = store_with(&[("alice", 10)]);

        let result = store.atomic_purchase("alice", "hoody", amount(300)).await;
        assert!(matches!(result, Err(StoreError::InsufficientFunds)));

        let alice = store.resolve_account("alice").await.unwrap().unwrap();
        assert_eq!(alice.balance.value(), 10);
        assert!(store.list_inventory(alice.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_account_once() {
        let store = InMemoryAccountStore::new();
        let initial = Balance::new(1000).unwrap();

        assert!(store.create_account("carol", "hash", initial).await.unwrap());
        assert!(!store.create_account("carol", "other", initial).await.unwrap());

        assert_eq!(
            store.find_password_hash("carol").await.unwrap().as_deref(),
            Some("hash")
        );
        assert!(store.find_password_hash("dave").await.unwrap().is_none());
    }
}

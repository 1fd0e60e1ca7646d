//! Command Handlers module
//!
//! Orchestrate the shop operations on top of an [`AccountStore`]. Handlers
//! are stateless apart from their injected store, catalog and deadline, so one
//! instance serves any number of concurrent requests.

mod commands;
mod info_handler;
mod purchase_handler;
mod transfer_handler;


use std::future::Future;
use std::time::Duration;

use crate::domain::{Account, DomainError};
use crate::store::{AccountStore, StoreError};

pub use commands::*;
pub use info_handler::InfoHandler;
pub use purchase_handler::PurchaseHandler;
pub use transfer_handler::TransferHandler;

/// Default per-operation deadline
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientFunds => DomainError::InsufficientFunds,
            StoreError::SameAccount(_) => DomainError::SelfTransfer,
            StoreError::AccountNotFound(username) => DomainError::UserNotFound(username),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

/// Run `operation` under `timeout`. Expiry drops the future, which cancels
/// every branch still in flight, and reports `Internal`.
pub(crate) async fn with_deadline<T, F>(timeout: Duration, operation: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Operation deadline exceeded");
            Err(DomainError::internal(format!(
                "operation timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}

/// Resolve `username`, mapping absence to `UserNotFound`
pub(crate) async fn resolve_account(
    store: &dyn AccountStore,
    username: &str,
) -> Result<Account, DomainError> {
    store
        .resolve_account(username)
        .await
        .map_err(|e| DomainError::internal(e.to_string()))?
        .ok_or_else(|| DomainError::UserNotFound(username.to_string()))
}

//! Info Handler
//!
//! Builds the full account snapshot: balance, inventory and both sides of the
//! transfer history.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{AccountSnapshot, DomainError, OperationContext};
use crate::store::AccountStore;

use super::{resolve_account, with_deadline, DEFAULT_OPERATION_TIMEOUT};

/// Handler for account snapshots
#[derive(Clone)]
pub struct InfoHandler {
    store: Arc<dyn AccountStore>,
    timeout: Duration,
}

impl InfoHandler {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Collect the snapshot for `username`.
    ///
    /// Never returns a partial snapshot: if any of the three history reads
    /// fails, the whole call fails with `Internal`.
    #[tracing::instrument(skip(self, context), fields(correlation_id = ?context.correlation_id))]
    pub async fn execute(
        &self,
        username: &str,
        context: &OperationContext,
    ) -> Result<AccountSnapshot, DomainError> {
        with_deadline(self.timeout, self.collect(username)).await
    }

    async fn collect(&self, username: &str) -> Result<AccountSnapshot, DomainError> {
        let account = resolve_account(self.store.as_ref(), username).await?;

        // First failure wins; the remaining reads are dropped unfinished.
        let (inventory, sent, received) = tokio::try_join!(
            self.store.list_inventory(account.id),
            self.store.list_sent_transfers(account.id),
            self.store.list_received_transfers(account.id),
        )
        .map_err(|e| {
            tracing::error!(username, error = %e, "Snapshot read failed");
            DomainError::internal(e.to_string())
        })?;

        tracing::debug!(
            username,
            coins = account.balance.value(),
            items = inventory.len(),
            sent = sent.len(),
            received = received.len(),
            "Snapshot collected"
        );

        Ok(AccountSnapshot::new(account.balance, inventory, sent, received))
    }
}

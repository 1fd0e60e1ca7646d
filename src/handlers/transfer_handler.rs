//! Transfer Handler
//!
//! Handles coin transfers between users.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Amount, DomainError, OperationContext};
use crate::store::AccountStore;

use super::{resolve_account, with_deadline, SendCoinCommand, DEFAULT_OPERATION_TIMEOUT};

/// Handler for coin transfers
#[derive(Clone)]
pub struct TransferHandler {
    store: Arc<dyn AccountStore>,
    timeout: Duration,
}

impl TransferHandler {
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

    /// Execute the transfer command
    #[tracing::instrument(
        skip(self, command, context),
        fields(
            from = %command.from_username,
            to = %command.to_username,
            amount = command.amount,
            correlation_id = ?context.correlation_id,
        )
    )]
    pub async fn execute(
        &self,
        command: SendCoinCommand,
        context: &OperationContext,
    ) -> Result<(), DomainError> {
        with_deadline(self.timeout, self.send(command)).await
    }

    async fn send(&self, command: SendCoinCommand) -> Result<(), DomainError> {
        let amount = Amount::new(command.amount)
            .map_err(|e| DomainError::InvalidAmount(e.to_string()))?;

        if command.from_username == command.to_username {
            return Err(DomainError::SelfTransfer);
        }

        let (sender, recipient) = tokio::try_join!(
            resolve_account(self.store.as_ref(), &command.from_username),
            resolve_account(self.store.as_ref(), &command.to_username),
        )?;

        // The balance check happens inside the store's conditional debit;
        // checking `sender.balance` here would race with other transfers.
        self.store
            .atomic_transfer(&sender.username, &recipient.username, amount)
            .await
            .map_err(|e| {
                let err = DomainError::from(e);
                if !err.is_client_error() {
                    tracing::error!(error = %err, "Transfer failed");
                }
                err
            })?;

        tracing::info!("Coins transferred");

        Ok(())
    }
}

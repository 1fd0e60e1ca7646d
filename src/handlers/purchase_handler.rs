//! Purchase Handler

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Catalog, DomainError, OperationContext};
use crate::store::AccountStore;

use super::{resolve_account, with_deadline, BuyItemCommand, DEFAULT_OPERATION_TIMEOUT};

/// Handler for merch purchases
#[derive(Clone)]
pub struct PurchaseHandler {
    store: Arc<dyn AccountStore>,
    catalog: Arc<Catalog>,
    timeout: Duration,
}

impl PurchaseHandler {
    pub fn new(store: Arc<dyn AccountStore>, catalog: Arc<Catalog>) -> Self {
        Self {
            store,
            catalog,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[tracing::instrument(
        skip(self, command, context),
        fields(
            username = %command.username,
            item = %command.item,
            correlation_id = ?context.correlation_id,
        )
    )]
    pub async fn execute(
        &self,
        command: BuyItemCommand,
        context: &OperationContext,
    ) -> Result<(), DomainError> {
        with_deadline(self.timeout, self.buy(command)).await
    }

    async fn buy(&self, command: BuyItemCommand) -> Result<(), DomainError> {
        // Catalog first: unknown items never reach the store.
        let price = self
            .catalog
            .price_of(&command.item)
            .ok_or_else(|| DomainError::ItemNotFound(command.item.clone()))?;

        let account = resolve_account(self.store.as_ref(), &command.username).await?;

        self.store
            .atomic_purchase(&account.username, &command.item, price)
            .await
            .map_err(|e| {
                let err = DomainError::from(e);
                if !err.is_client_error() {
                    tracing::error!(error = %err, "Purchase failed");
                }
                err
            })?;

        tracing::info!(price = price.value(), "Item purchased");

        Ok(())
    }
}

//! Shared router state

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthHandler, TokenService};
use crate::config::Config;
use crate::domain::{Balance, Catalog};
use crate::handlers::{InfoHandler, PurchaseHandler, TransferHandler, DEFAULT_OPERATION_TIMEOUT};
use crate::store::AccountStore;

/// Tunables that shape the handlers
#[derive(Debug, Clone, Copy)]
pub struct ShopOptions {
    pub initial_balance: Balance,
    pub operation_timeout: Duration,
}

impl Default for ShopOptions {
    fn default() -> Self {
        Self {
            initial_balance: Balance::new(1000).unwrap_or_default(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl From<&Config> for ShopOptions {
    fn from(config: &Config) -> Self {
        Self {
            initial_balance: config.initial_coins,
            operation_timeout: config.operation_timeout,
        }
    }
}

/// Handlers shared by every request
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthHandler,
    pub info: InfoHandler,
    pub transfers: TransferHandler,
    pub purchases: PurchaseHandler,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AccountStore>,
        catalog: Arc<Catalog>,
        tokens: Arc<TokenService>,
        options: ShopOptions,
    ) -> Self {
        Self {
            auth: AuthHandler::new(store.clone(), tokens.clone(), options.initial_balance),
            info: InfoHandler::new(store.clone()).with_timeout(options.operation_timeout),
            transfers: TransferHandler::new(store.clone())
                .with_timeout(options.operation_timeout),
            purchases: PurchaseHandler::new(store, catalog)
                .with_timeout(options.operation_timeout),
            tokens,
        }
    }
}

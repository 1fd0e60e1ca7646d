//! Auth Handler
//!
//! First login for a username registers it with the starting balance;
//! later logins must present the same password.

use std::sync::Arc;

use crate::domain::Balance;
use crate::store::AccountStore;

use super::{hash_password, verify_password, AuthError, TokenService};

#[derive(Clone)]
pub struct AuthHandler {
    store: Arc<dyn AccountStore>,
    tokens: Arc<TokenService>,
    initial_balance: Balance,
}

impl AuthHandler {
    pub fn new(
        store: Arc<dyn AccountStore>,
        tokens: Arc<TokenService>,
        initial_balance: Balance,
    ) -> Self {
        Self {
            store,
            tokens,
            initial_balance,
        }
    }

    /// Authenticate (registering on first sight) and return a bearer token
    #[tracing::instrument(skip(self, password))]
    pub async fn execute(&self, username: &str, password: &str) -> Result<String, AuthError> {
        match self.store.find_password_hash(username).await? {
            Some(stored) => self.check_password(stored, password).await?,
            None => {
                let hash = {
                    let password = password.to_string();
                    tokio::task::spawn_blocking(move || hash_password(&password))
                        .await
                        .map_err(|e| AuthError::Hashing(e.to_string()))??
                };

                if self
                    .store
                    .create_account(username, &hash, self.initial_balance)
                    .await?
                {
                    tracing::info!(
                        coins = self.initial_balance.value(),
                        "Account created"
                    );
                } else {
                    // A concurrent first login won the insert; treat ours as a
                    // regular login against the stored hash.
                    let stored = self
                        .store
                        .find_password_hash(username)
                        .await?
                        .ok_or(AuthError::InvalidCredentials)?;
                    self.check_password(stored, password).await?;
                }
            }
        }

        self.tokens.issue(username)
    }

    async fn check_password(&self, stored: String, password: &str) -> Result<(), AuthError> {
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&stored, &password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;

        if matches {
            Ok(())
        } else {
            tracing::warn!("Password mismatch");
            Err(AuthError::InvalidCredentials)
        }
    }
}

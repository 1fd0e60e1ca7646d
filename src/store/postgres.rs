//! Postgres Account Store
//!
//! sqlx-backed implementation of [`AccountStore`].
//!
//! Both mutating operations run inside one transaction whose first statement
//! is a conditional `UPDATE` guarded by `coins >= amount`. Postgres re-checks
//! that predicate against the latest row version after acquiring the row
//! lock, so two concurrent debits of the same account can never both pass.
//! The `CHECK (coins >= 0)` constraint on `users` backs the predicate.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Account, Amount, Balance, InventoryItem, ReceivedTransfer, SentTransfer};

use super::{AccountStore, StoreError};

/// Account store backed by a Postgres pool
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguish "no such account" from "guard rejected the debit" after a
    /// conditional update touched fewer rows than expected.
    async fn debit_failure(
        tx: &mut Transaction<'_, Postgres>,
        username: &str,
    ) -> Result<StoreError, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&mut **tx)
                .await?;

        Ok(if exists {
            StoreError::InsufficientFunds
        } else {
            StoreError::AccountNotFound(username.to_string())
        })
    }
}

fn to_amount(value: i64) -> Result<Amount, StoreError> {
    Amount::new(value).map_err(|e| StoreError::InvalidData(e.to_string()))
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn resolve_account(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let row: Option<(Uuid, String, i64)> =
            sqlx::query_as("SELECT id, username, coins FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id, username, coins)| {
            let balance =
                Balance::new(coins).map_err(|e| StoreError::InvalidData(e.to_string()))?;
            Ok(Account {
                id,
                username,
                balance,
            })
        })
        .transpose()
    }

    async fn list_inventory(&self, account_id: Uuid) -> Result<Vec<InventoryItem>, StoreError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT item_name, quantity
            FROM inventory
            WHERE user_id = $1 AND quantity > 0
            ORDER BY item_name
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(sku, quantity)| InventoryItem { sku, quantity })
            .collect())
    }

    async fn list_sent_transfers(&self, account_id: Uuid) -> Result<Vec<SentTransfer>, StoreError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT u.username, t.amount
            FROM transfers t
            JOIN users u ON u.id = t.to_user_id
            WHERE t.from_user_id = $1
            ORDER BY t.id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(to_user, amount)| {
                Ok(SentTransfer {
                    to_user,
                    amount: to_amount(amount)?,
                })
            })
            .collect()
    }

    async fn list_received_transfers(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<ReceivedTransfer>, StoreError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT u.username, t.amount
            FROM transfers t
            JOIN users u ON u.id = t.from_user_id
            WHERE t.to_user_id = $1
            ORDER BY t.id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(from_user, amount)| {
                Ok(ReceivedTransfer {
                    from_user,
                    amount: to_amount(amount)?,
                })
            })
            .collect()
    }

    async fn atomic_transfer(&self, from: &str, to: &str, amount: Amount) -> Result<(), StoreError> {
        // The CASE below would debit and credit the same row.
        if from == to {
            return Err(StoreError::SameAccount(from.to_string()));
        }

        let mut tx = self.pool.begin().await?;

        // One statement moves both balances, so crossing transfers never take
        // the two row locks in opposite orders.
        let touched: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            UPDATE users
            SET coins = CASE WHEN username = $1 THEN coins - $3 ELSE coins + $3 END
            WHERE username IN ($1, $2)
              AND (username <> $1 OR coins >= $3)
            RETURNING id, username
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(amount.value())
        .fetch_all(&mut *tx)
        .await
        .map_err(StoreError::from_debit)?;

        let from_id = touched.iter().find(|(_, name)| name == from).map(|(id, _)| *id);
        let to_id = touched.iter().find(|(_, name)| name == to).map(|(id, _)| *id);

        let (from_id, to_id) = match (from_id, to_id) {
            (Some(from_id), Some(to_id)) => (from_id, to_id),
            (None, _) => return Err(Self::debit_failure(&mut tx, from).await?),
            (Some(_), None) => return Err(StoreError::AccountNotFound(to.to_string())),
        };

        sqlx::query(
            r#"
            INSERT INTO transfers (from_user_id, to_user_id, amount)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(from_id)
        .bind(to_id)
        .bind(amount.value())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(from, to, amount = amount.value(), "Transfer committed");

        Ok(())
    }

    async fn atomic_purchase(
        &self,
        username: &str,
        sku: &str,
        price: Amount,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET coins = coins - $2
            WHERE username = $1 AND coins >= $2
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(price.value())
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::from_debit)?;

        let user_id = match user_id {
            Some(id) => id,
            None => return Err(Self::debit_failure(&mut tx, username).await?),
        };

        sqlx::query(
            r#"
            INSERT INTO inventory (user_id, item_name, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, item_name)
            DO UPDATE SET quantity = inventory.quantity + 1
            "#,
        )
        .bind(user_id)
        .bind(sku)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(username, sku, price = price.value(), "Purchase committed");

        Ok(())
    }

    async fn find_password_hash(&self, username: &str) -> Result<Option<String>, StoreError> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(hash)
    }

    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        initial_balance: Balance,
    ) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, coins)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(initial_balance.value())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected == 1)
    }
}

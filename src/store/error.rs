//! Store Errors
//!
//! Error types for account store operations.

/// Errors that can occur in the account store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The guarded debit found the balance too low; nothing was written
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Sender and recipient are the same account; nothing was written
    #[error("Cannot transfer to the same account: {0}")]
    SameAccount(String),

    /// Account vanished between resolution and mutation
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row violates a domain invariant (negative balance, zero amount, ...)
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Store could not serve the request (lock poisoned, shut down)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Postgres SQLSTATE for `check_violation`
const CHECK_VIOLATION: &str = "23514";

impl StoreError {
    /// True when the error came from a CHECK constraint such as `coins >= 0`
    pub fn is_check_violation(err: &sqlx::Error) -> bool {
        match err {
            sqlx::Error::Database(db) => db.code().as_deref() == Some(CHECK_VIOLATION),
            _ => false,
        }
    }

    /// Map a database error raised inside a guarded debit.
    ///
    /// The `coins >= 0` constraint backs the conditional update, so a check
    /// violation there is an overdraft, not an infrastructure failure.
    pub fn from_debit(err: sqlx::Error) -> Self {
        if Self::is_check_violation(&err) {
            StoreError::InsufficientFunds
        } else {
            StoreError::Database(err)
        }
    }
}

//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Outcome kinds of the shop operations.
///
/// Callers match on the variant; the message text is for humans only.
/// `Internal` carries a diagnostic string that is logged but never sent to
/// clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No account exists for this username
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// SKU is not in the catalog
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Balance does not cover the debit
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Zero or negative transfer amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Sender and recipient are the same account
    #[error("Cannot transfer coins to yourself")]
    SelfTransfer,

    /// Any lower-layer failure, including deadline expiry
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// Check if this is a client error (caller can act on it)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Stable machine-readable code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "user_not_found",
            Self::ItemNotFound(_) => "item_not_found",
            Self::InsufficientFunds => "insufficient_funds",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::SelfTransfer => "self_transfer",
            Self::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_compare_by_variant() {
        assert_eq!(DomainError::InsufficientFunds, DomainError::InsufficientFunds);
        assert!(matches!(
            DomainError::UserNotFound("ghost".into()),
            DomainError::UserNotFound(_)
        ));
        assert_ne!(
            DomainError::UserNotFound("a".into()).code(),
            DomainError::ItemNotFound("a".into()).code()
        );
    }

    #[test]
    fn test_internal_is_not_client_error() {
        let err = DomainError::internal("connection reset");
        assert!(!err.is_client_error());
        assert_eq!(err.code(), "internal_error");

        assert!(DomainError::InsufficientFunds.is_client_error());
        assert!(DomainError::SelfTransfer.is_client_error());
    }
}

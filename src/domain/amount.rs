//! Coin quantities
//!
//! Domain primitives for coin amounts. Coins are whole units; there are no
//! fractions. Invalid values are rejected at construction time so they cannot
//! reach the store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum amount accepted in a single operation.
const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Amount is a strictly positive number of coins moved by one operation.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Value never exceeds `MAX_AMOUNT`
///
/// # Example
/// ```
/// use coin_shop::domain::Amount;
///
/// let amount = Amount::new(60).unwrap();
/// assert_eq!(amount.value(), 60);
/// assert!(Amount::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

/// Errors that can occur when creating an Amount or Balance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(i64),

    #[error("Balance cannot be negative (got {0})")]
    Negative(i64),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::Overflow` if value > `MAX_AMOUNT`
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value <= 0 {
            return Err(AmountError::NotPositive(value));
        }
        if value > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }
        Ok(Self(value))
    }

    /// Create an Amount without validation.
    /// WARNING: Only for compile-time constants known to be positive
    pub(crate) fn from_unchecked(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Balance of an account. Unlike Amount, Balance can be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Balance(i64);

impl Balance {
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value < 0 {
            return Err(AmountError::Negative(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Add amount to balance
    pub fn credit(&self, amount: Amount) -> Result<Balance, AmountError> {
        self.0
            .checked_add(amount.value())
            .ok_or(AmountError::Overflow)
            .and_then(Balance::new)
    }

    /// Subtract amount from balance; fails rather than going negative
    pub fn debit(&self, amount: Amount) -> Result<Balance, AmountError> {
        Balance::new(self.0 - amount.value())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Balance {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Balance::new(value)
    }
}

impl From<Balance> for i64 {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(100);
        assert_eq!(amount.unwrap().value(), 100);
    }

    #[test]
    fn test_amount_zero_rejected() {
        assert!(matches!(Amount::new(0), Err(AmountError::NotPositive(0))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        assert!(matches!(Amount::new(-5), Err(AmountError::NotPositive(-5))));
    }

    #[test]
    fn test_amount_overflow() {
        assert!(matches!(
            Amount::new(MAX_AMOUNT + 1),
            Err(AmountError::Overflow)
        ));
        assert!(Amount::new(MAX_AMOUNT).is_ok());
    }

    #[test]
    fn test_amount_deserialize_rejects_zero() {
        let parsed: Result<Amount, _> = serde_json::from_str("0");
        assert!(parsed.is_err());

        let parsed: Amount = serde_json::from_str("42").unwrap();
        assert_eq!(parsed.value(), 42);
    }

    #[test]
    fn test_balance_credit_debit() {
        let balance = Balance::default();

        let balance = balance.credit(Amount::new(100).unwrap()).unwrap();
        assert_eq!(balance.value(), 100);

        let balance = balance.debit(Amount::new(30).unwrap()).unwrap();
        assert_eq!(balance.value(), 70);
    }

    #[test]
    fn test_balance_insufficient() {
        let balance = Balance::new(50).unwrap();
        let amount = Amount::new(100).unwrap();

        assert!(matches!(balance.debit(amount), Err(AmountError::Negative(-50))));
    }

    #[test]
    fn test_exact_balance_debit() {
        let balance = Balance::new(100).unwrap();
        let amount = Amount::new(100).unwrap();

        assert_eq!(balance.debit(amount).unwrap(), Balance::default());
    }
}

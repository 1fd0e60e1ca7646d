//! Authentication errors

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Wrong password for an existing account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired or forged bearer token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Check if the caller is at fault (maps to 401)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::InvalidToken(_))
    }
}

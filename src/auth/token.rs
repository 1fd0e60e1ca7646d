//! Bearer tokens
//!
//! HS256 JWTs carrying the username, issue time and expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issues and verifies tokens with one shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    has_secret: bool,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            has_secret: !secret.is_empty(),
        }
    }

    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        if !self.has_secret {
            return Err(AuthError::MissingSecret);
        }

        let now = Utc::now();
        let claims = Claims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Validate signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        if !self.has_secret {
            return Err(AuthError::MissingSecret);
        }

        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.username.is_empty() {
            return Err(AuthError::InvalidToken("empty username claim".to_string()));
        }

        Ok(data.claims)
    }
}

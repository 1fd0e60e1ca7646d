//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::domain::{Balance, Catalog, CatalogError};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// HMAC secret for bearer tokens
    pub jwt_secret: String,

    /// Token lifetime in hours
    pub token_ttl_hours: i64,

    /// Balance granted on first login
    pub initial_coins: Balance,

    /// Deadline applied to each shop operation
    pub operation_timeout: Duration,

    /// Create missing tables at startup
    pub auto_migrate: bool,

    /// Merch on sale
    pub catalog: Catalog,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = parse_or(&lookup, "PORT", 8080)?;

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingEnv("JWT_SECRET"))?;

        let token_ttl_hours: i64 = parse_or(&lookup, "TOKEN_TTL_HOURS", 24)?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue("TOKEN_TTL_HOURS"));
        }

        let initial_coins = Balance::new(parse_or(&lookup, "INITIAL_COINS", 1000)?)
            .map_err(|_| ConfigError::InvalidValue("INITIAL_COINS"))?;

        let timeout_ms: u64 = parse_or(&lookup, "OPERATION_TIMEOUT_MS", 5000)?;
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("OPERATION_TIMEOUT_MS"));
        }

        let auto_migrate = parse_or(&lookup, "AUTO_MIGRATE", true)?;

        let catalog = match lookup("SHOP_CATALOG") {
            Some(raw) => raw.parse()?,
            None => Catalog::default(),
        };

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            jwt_secret,
            token_ttl_hours,
            initial_coins,
            operation_timeout: Duration::from_millis(timeout_ms),
            auto_migrate,
            catalog,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid SHOP_CATALOG: {0}")]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/shop"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(REQUIRED).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.initial_coins.value(), 1000);
        assert_eq!(config.operation_timeout, Duration::from_secs(5));
        assert_eq!(config.token_ttl_hours, 24);
        assert!(config.auto_migrate);
        assert!(!config.is_production());
        assert_eq!(config.catalog, Catalog::default());
    }

    #[test]
    fn test_missing_required() {
        assert!(matches!(
            load(&[("JWT_SECRET", "secret")]),
            Err(ConfigError::MissingEnv("DATABASE_URL"))
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "")]),
            Err(ConfigError::MissingEnv("JWT_SECRET"))
        ));
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "eighty"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidValue("PORT"))));

        let mut vars = REQUIRED.to_vec();
        vars.push(("INITIAL_COINS", "-1"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidValue("INITIAL_COINS"))
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("OPERATION_TIMEOUT_MS", "0"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_catalog_override() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SHOP_CATALOG", "mug=15,sticker=2"));
        let config = load(&vars).unwrap();
        assert_eq!(config.catalog.len(), 2);

        let mut vars = REQUIRED.to_vec();
        vars.push(("SHOP_CATALOG", "mug=free"));
        assert!(matches!(load(&vars), Err(ConfigError::Catalog(_))));
    }
}

//! coin_shop Library
//!
//! Coin balances, peer transfers and merch purchases behind an HTTP API.
//! Re-exports modules for the server binary, the load test and integration
//! tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod store;

mod error;

pub use config::Config;
pub use domain::{Amount, AmountError, Balance, Catalog, DomainError, OperationContext};
pub use error::{AppError, ErrorResponse};

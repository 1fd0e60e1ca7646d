//! Authentication module
//!
//! Login-or-register, password hashing and bearer tokens. The shop handlers
//! only ever see the username extracted from a verified token.

mod error;
mod handler;
mod password;
mod token;

pub use error::AuthError;
pub use handler::AuthHandler;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

/// Authentication module
///
/// Handles JWT signing/verification, the access/refresh token lifecycle,
/// password hashing, and refresh token digests.

mod claims;
mod jwt;
mod password;
mod refresh_token;
mod token_service;

pub use claims::{AccessClaims, RefreshClaims};
pub use password::{hash_password, verify_password, verify_password_without_user};
pub use refresh_token::hash_token;
pub use token_service::{TokenPair, TokenService};

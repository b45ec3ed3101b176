/// JWT Encoding and Decoding
///
/// Thin HS256 wrappers over `jsonwebtoken`, shared by both token kinds.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{TokenError, VerificationError};

/// Sign `claims` with `secret`
///
/// # Errors
/// Returns `TokenError::Signing` if the library fails to encode the token
pub fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Signing)
}

/// Verify signature and expiry, returning the decoded claims
///
/// Expiry is checked without leeway.
///
/// # Errors
/// `Expired` for an expired token with a valid signature, `Malformed` otherwise
pub fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, VerificationError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(VerificationError::from)
}

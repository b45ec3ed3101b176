/// Password Hashing and Verification
///
/// bcrypt hashing plus the strength rules applied whenever a password is set.

use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static! {
    // same cost as real hashes, so a miss takes as long as a wrong password
    static ref DUMMY_HASH: Option<String> = hash("dummy-Password-0", DEFAULT_COST).ok();
}

/// Check strength, then hash with bcrypt
///
/// # Errors
/// `AppError::Validation` for a weak password, `AppError::Internal` if
/// bcrypt fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    check_password_strength(password)?;

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored bcrypt hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    verify(password, password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Spend the same bcrypt work as `verify_password` when there is no stored
/// hash to check against. Always false.
pub fn verify_password_without_user(password: &str) -> bool {
    if let Some(dummy) = DUMMY_HASH.as_deref() {
        let _ = verify(password, dummy);
    }
    false
}

/// Requirements: 8 to 128 characters, with at least one digit, one lowercase
/// and one uppercase letter
fn check_password_strength(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password".to_string(), MIN_PASSWORD_LENGTH));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_LENGTH));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lowercase = password.chars().any(char::is_lowercase);
    let has_uppercase = password.chars().any(char::is_uppercase);

    if !(has_digit && has_lowercase && has_uppercase) {
        return Err(ValidationError::InvalidFormat(
            "password must contain a digit, a lowercase and an uppercase letter".to_string(),
        ));
    }

    Ok(())
}

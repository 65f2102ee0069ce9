/// Password Hashing and Verification
///
/// bcrypt with a random salt per call. The cost factor comes from
/// `AuthSettings::password_hash_cost`.

use bcrypt::{hash, verify};

use crate::error::{AppError, ValidationError};

/// bcrypt only looks at the first 72 bytes; longer input is refused rather
/// than silently truncated.
const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt
///
/// # Errors
/// - `ValidationError` if the password is empty or longer than 72 bytes
/// - `Internal` if bcrypt rejects the cost factor
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()).into());
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(
            ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES).into(),
        );
    }

    hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// Never fails: a malformed hash simply does not match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Password verification against malformed hash: {}", e);
            false
        }
    }
}

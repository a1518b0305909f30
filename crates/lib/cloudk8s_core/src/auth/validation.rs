//! Shape checks for login input, applied before any credential lookup.

use super::AuthError;

const MIN_LOGIN_LENGTH: usize = 3;
const MAX_LOGIN_LENGTH: usize = 50;
const PASSWORD_HASH_LENGTH: usize = 64;

/// A login is 3 to 50 characters of `[A-Za-z0-9_.-]`.
pub fn validate_login(login: &str) -> Result<(), AuthError> {
    let len = login.chars().count();
    if !(MIN_LOGIN_LENGTH..=MAX_LOGIN_LENGTH).contains(&len) {
        return Err(AuthError::ValidationError(format!(
            "login must be between {MIN_LOGIN_LENGTH} and {MAX_LOGIN_LENGTH} characters"
        )));
    }
    if !login
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AuthError::ValidationError(
            "login contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// A password hash is a SHA-256 hex digest: exactly 64 hex digits.
pub fn validate_password_hash(hash: &str) -> Result<(), AuthError> {
    if hash.len() != PASSWORD_HASH_LENGTH || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AuthError::ValidationError(
            "password hash must be a 64 character hexadecimal SHA-256 digest".to_string(),
        ));
    }
    Ok(())
}

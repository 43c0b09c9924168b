use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;

use super::errors::AuthError;

/// Hash a raw password into a PHC string with a fresh random salt.
pub fn hash_password(raw: &str) -> Result<String, AuthError> {
    if raw.is_empty() {
        return Err(AuthError::Validation("password required".into()));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

/// Constant-time check of `raw` against a stored PHC string.
/// Malformed stored hashes never verify.
pub fn verify_password(raw: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default().verify_password(raw.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

//! Password hashing helpers built on argon2id.
//!
//! Hashes are stored as PHC strings, so parameters and salts travel with the
//! hash and verification needs no extra configuration.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::{ServiceError, ServiceResult};

/// Hashes a plain-text password with a fresh random salt.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|error| {
            ServiceError::internal_error(format!("Password hashing failed: {}", error))
        })?;
    Ok(hash.to_string())
}

/// Verifies a plain-text password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch; an error only when the stored hash
/// itself cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> ServiceResult<bool> {
    let parsed = PasswordHash::new(password_hash).map_err(|error| {
        ServiceError::internal_error(format!("Stored password hash is invalid: {}", error))
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same input").unwrap();
        let second = hash_password("same input").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_hash_is_an_error_not_a_match() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}

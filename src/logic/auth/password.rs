//! Kiosk Password Hashing
//!
//! The browser build of the app stored the kiosk password base64-encoded,
//! which is reversible. Here the password is stored as a salted Argon2 PHC
//! string and verified in constant time.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{AppError, AppResult};

/// Hash a password into a PHC string for persistence.
pub fn hash_password(plain: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Verify a password against a stored PHC string.
///
/// A malformed stored hash counts as a mismatch rather than an error; the
/// login guard treats every outcome as a value.
pub fn verify_password(plain: &str, phc_hash: &str) -> bool {
    let parsed = match PasswordHash::new(phc_hash) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("Stored password hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Constant-time string comparison
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("fisio2024").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("fisio2024", &hash));
        assert!(!verify_password("fisio2025", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("mesma-senha").unwrap();
        let b = hash_password("mesma-senha").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_stored_hash_is_a_mismatch() {
        assert!(!verify_password("qualquer", "ZmlzaW8yMDI0"));
        assert!(!verify_password("qualquer", ""));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
        assert!(constant_time_compare("", ""));
    }
}

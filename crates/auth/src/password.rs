//! Password hashing (Argon2id, PHC string format).

use argon2::Argon2;
use argon2::password_hash::{self, PasswordHash, PasswordVerifier, SaltString};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hashes and verifies user passwords with the default Argon2id parameters.
#[derive(Debug, Copy, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        use argon2::password_hash::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored PHC string.
    pub fn verify(&self, password: &str, phc: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(phc).map_err(|e| {
            tracing::warn!(error = %e, "stored password hash could not be parsed");
            PasswordError::MalformedHash(e.to_string())
        })?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Hash(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new();
        let phc = hasher.hash("password123").unwrap();

        assert!(phc.starts_with("$argon2id$"));
        assert!(hasher.verify("password123", &phc).unwrap());
        assert!(!hasher.verify("password124", &phc).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = PasswordHasher::new();
        assert_ne!(hasher.hash("pw-pw-pw").unwrap(), hasher.hash("pw-pw-pw").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let err = PasswordHasher::new().verify("x", "plaintext").unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }
}

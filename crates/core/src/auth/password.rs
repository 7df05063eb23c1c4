//! Argon2id password hashing and verification.
//!
//! All password hashes use the Argon2id variant with a random salt from
//! [`OsRng`], stored in PHC string format so parameters and salt travel with
//! the hash. Entity code depends on the [`CredentialHasher`] trait rather
//! than on Argon2 directly, so tests can observe how often hashing runs.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::CoreError;

/// Hashes new passwords and verifies candidates against stored hashes.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CoreError>;

    /// `Ok(false)` on mismatch; `Err` only if the stored hash is unreadable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CoreError>;
}

/// Production [`CredentialHasher`] backed by Argon2id with default params.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, CoreError> {
        hash_password(password)
            .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CoreError> {
        verify_password(password, hash)
            .map_err(|e| CoreError::Internal(format!("Password verification error: {e}")))
    }
}

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

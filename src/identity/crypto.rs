//! Argon2id password hashing.
//!
//! Hashes are PHC strings carrying their own salt and parameters, so
//! verification only needs the stored value. The constant-time comparison is
//! done by the `password-hash` crate.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
/// Returns an error if the hasher rejects the input.
pub fn hash_password(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|_| anyhow!("failed to hash password"))?
        .to_string();
    Ok(hash)
}

/// Verify a candidate against a stored PHC hash. Malformed hashes never match.
#[must_use]
pub fn verify_password(stored_hash: &str, candidate: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

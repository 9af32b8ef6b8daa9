//! One-way password hashing (Argon2 PHC strings).

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher as _, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

/// One-way transform with verification.
pub trait PasswordHasher: Send + Sync {
    /// Salted, irreversible digest of the plaintext.
    ///
    /// # Errors
    /// Returns an error if the hashing backend fails.
    fn hash(&self, plaintext: &str) -> Result<String>;

    /// Must return `false` for malformed digests, never fail.
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;

        Ok(digest.to_string())
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

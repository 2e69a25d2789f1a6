//! One-way hashing and generation for short numeric login secrets.
//!
//! Codes are Argon2id-hashed with a fresh salt so that a leaked hash cannot
//! be brute-forced over the 6-digit space within the challenge's validity
//! window. Entropy failure aborts the process rather than degrading.

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::{Rng, rngs::OsRng};

pub const OTP_LEN: usize = 6;

/// Generate a login code, uniform over [000000, 999999], leading zeros kept.
#[must_use]
pub fn generate_otp() -> String {
    let value: u32 = OsRng.gen_range(0..1_000_000);
    format!("{value:06}")
}

/// One configured hasher per process, passed by reference into the
/// challenge engine.
#[derive(Clone)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
}

impl SecretHasher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hash a secret with a fresh salt; returns a PHC-format string.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    pub fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|_| anyhow!("failed to hash secret"))?;
        Ok(hash.to_string())
    }

    /// Verify a secret against a stored PHC hash.
    #[must_use]
    pub fn verify(&self, secret: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self::new()
    }
}

//! Salted, slow password hashing.
//!
//! Hashes are Argon2id PHC strings, so each one carries the parameters it
//! was produced with. Verification reads them back from the hash, which
//! lets the configured cost change without invalidating stored credentials.

use crate::VicatError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,

    /// Number of passes over memory.
    pub iterations: u32,

    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashCost {
    /// The cheapest cost Argon2 accepts. Only suitable for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    /// Check the cost is accepted by Argon2.
    pub fn validate(&self) -> Result<(), VicatError> {
        self.params().map(|_| ())
    }

    fn params(&self) -> Result<Params, VicatError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| VicatError::ConfigError(format!("invalid hash cost: {}", e)))
    }
}

/// Hashes and verifies passwords.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    cost: HashCost,
    decoy: String,
}

impl CredentialStore {
    /// Create a credential store producing hashes at the given cost.
    ///
    /// Hashes one throwaway password up front so that
    /// [`verify_decoy`](Self::verify_decoy) costs the same as a real check.
    pub fn new(cost: HashCost) -> Result<Self, VicatError> {
        cost.validate()?;
        let decoy = hash_with(cost, &crate::crypto::random::session_token())?;
        Ok(Self { cost, decoy })
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, VicatError> {
        hash_with(self.cost, plaintext)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Malformed hashes verify as `false`.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run a full verification that always fails.
    ///
    /// Used when no account matches, so that path takes as long as a wrong
    /// password.
    pub fn verify_decoy(&self, plaintext: &str) -> bool {
        self.verify(plaintext, &self.decoy)
    }
}

fn hash_with(cost: HashCost, plaintext: &str) -> Result<String, VicatError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, cost.params()?);

    argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| VicatError::Hashing(e.to_string()))
}

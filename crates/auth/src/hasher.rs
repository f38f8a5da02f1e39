//! Salted one-way credential hashing.
//!
//! The hasher is an external collaborator with a two-operation contract:
//! `generate_salt` and `hash`. It may be unavailable in constrained runtimes
//! (e.g. no secure random source); callers must surface that as
//! [`HashError::Unavailable`], never as a wrong password.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Bytes of entropy in a generated salt (hex-encoded to twice as many chars).
pub const SALT_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("credential hashing unavailable: {0}")]
    Unavailable(String),
}

/// Deterministic salted hash contract.
///
/// - `hash(p, s) == hash(p, s)` for repeated calls
/// - `hash(p, s1) != hash(p, s2)` when `s1 != s2`, with overwhelming probability
pub trait CredentialHasher: Send + Sync {
    /// A fresh opaque salt, unique per call with overwhelming probability.
    fn generate_salt(&self) -> Result<String, HashError>;

    /// Lower-case hex digest of `password` under `salt`.
    fn hash(&self, password: &str, salt: &str) -> Result<String, HashError>;
}

impl<H> CredentialHasher for std::sync::Arc<H>
where
    H: CredentialHasher + ?Sized,
{
    fn generate_salt(&self) -> Result<String, HashError> {
        (**self).generate_salt()
    }

    fn hash(&self, password: &str, salt: &str) -> Result<String, HashError> {
        (**self).hash(password, salt)
    }
}

/// SHA-256 over `password || salt`, hex-encoded (64 chars).
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl CredentialHasher for Sha256Hasher {
    fn generate_salt(&self) -> Result<String, HashError> {
        let mut bytes = [0u8; SALT_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| HashError::Unavailable(format!("secure random source: {e}")))?;
        Ok(hex::encode(bytes))
    }

    fn hash(&self, password: &str, salt: &str) -> Result<String, HashError> {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hasher.update(salt.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

/// A hasher that can never execute, standing in for runtimes without a
/// usable digest implementation.
#[derive(Debug, Clone, Default)]
pub struct UnavailableHasher {
    reason: String,
}

impl UnavailableHasher {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl CredentialHasher for UnavailableHasher {
    fn generate_salt(&self) -> Result<String, HashError> {
        Err(HashError::Unavailable(self.reason.clone()))
    }

    fn hash(&self, _password: &str, _salt: &str) -> Result<String, HashError> {
        Err(HashError::Unavailable(self.reason.clone()))
    }
}

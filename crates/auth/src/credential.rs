//! Credential matching and preparation.
//!
//! Stored credentials come in two shapes: legacy plain text (written before
//! hashing was introduced) and salted digests. Matching tries both.

use tracing::warn;

use crate::hasher::{CredentialHasher, HashError};

/// Values of at least this many characters are treated as already hashed.
pub const HASHED_MIN_LEN: usize = 30;

/// Whether a stored value is already a digest and must not be re-hashed.
pub fn is_hashed(value: &str) -> bool {
    value.chars().count() >= HASHED_MIN_LEN
}

/// A credential in the form it is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub password: String,
    pub salt: String,
}

impl core::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("password", &"<redacted>")
            .field("salt", &self.salt)
            .finish()
    }
}

/// Turn a submitted credential value into its persisted form.
///
/// A value of [`HASHED_MIN_LEN`] or more characters is kept verbatim with the
/// existing salt; anything shorter is hashed under a fresh salt.
pub fn prepare_credential(
    hasher: &dyn CredentialHasher,
    value: &str,
    existing_salt: Option<&str>,
) -> Result<StoredCredential, HashError> {
    if is_hashed(value) {
        return Ok(StoredCredential {
            password: value.to_string(),
            salt: existing_salt.unwrap_or_default().to_string(),
        });
    }

    let salt = hasher.generate_salt()?;
    let password = hasher.hash(value, &salt)?;
    Ok(StoredCredential { password, salt })
}

/// Compares submitted passwords against stored credentials for one
/// resolution attempt, remembering whether hashing ever failed.
pub struct CredentialVerifier<'a> {
    hasher: &'a dyn CredentialHasher,
    allow_plaintext: bool,
    hash_unavailable: bool,
}

impl<'a> CredentialVerifier<'a> {
    pub fn new(hasher: &'a dyn CredentialHasher, allow_plaintext: bool) -> Self {
        Self {
            hasher,
            allow_plaintext,
            hash_unavailable: false,
        }
    }

    /// Plain equality first, then the salted digest.
    ///
    /// A hashing failure counts as "cannot confirm" and is recorded so the
    /// final decline can report it.
    pub fn matches(&mut self, supplied: &str, stored: &str, salt: &str) -> bool {
        if stored.is_empty() || supplied.is_empty() {
            return false;
        }

        if self.allow_plaintext && supplied == stored {
            if !is_hashed(stored) {
                warn!("credential matched a plain-text stored value");
            }
            return true;
        }

        match self.hasher.hash(supplied, salt) {
            Ok(digest) => digest.eq_ignore_ascii_case(stored),
            Err(HashError::Unavailable(reason)) => {
                warn!(%reason, "credential hash check could not run");
                self.hash_unavailable = true;
                false
            }
        }
    }

    pub fn hash_unavailable(&self) -> bool {
        self.hash_unavailable
    }
}

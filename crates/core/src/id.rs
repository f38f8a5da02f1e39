//! Strongly-typed identifiers used across the tenant model.
//!
//! All identifiers are string document keys. Normalization happens at the
//! edges: tenant codes are trimmed and upper-cased, usernames trimmed and
//! lower-cased, and every comparison goes through the normalized form.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::validation;

/// Identifier of a tenant ("company"), e.g. `ACME01`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantCode(String);

/// Identifier of a unit ("store") owned by a tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

/// A login name in normalized (trimmed, lower-case) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

macro_rules! impl_key_newtype {
    ($t:ty) => {
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_key_newtype!(TenantCode);
impl_key_newtype!(UnitId);
impl_key_newtype!(Username);

impl TenantCode {
    /// Trim and upper-case raw input.
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    /// Parse and validate a tenant code (3–10 ASCII alphanumerics).
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = Self::normalize(raw);
        validation::validate_tenant_code(&normalized)?;
        Ok(Self(normalized))
    }

    /// Normalize login input without enforcing the code pattern.
    ///
    /// Returns `None` when no tenant context was supplied. A malformed code
    /// simply fails to resolve against the store.
    pub fn from_input(raw: &str) -> Option<Self> {
        let normalized = Self::normalize(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }
}

impl FromStr for TenantCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Username {
    /// Normalize raw input: trimmed, lower-case.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive, whitespace-tolerant comparison against a stored name.
    pub fn matches(&self, stored: &str) -> bool {
        !self.0.is_empty() && stored.trim().to_lowercase() == self.0
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::normalize(value)
    }
}

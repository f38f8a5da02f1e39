//! Resolver configuration.

use opsdesk_core::Username;

pub const ENV_SYSTEM_USERNAME: &str = "OPSDESK_SYSTEM_USERNAME";
pub const ENV_SYSTEM_PASSWORD: &str = "OPSDESK_SYSTEM_PASSWORD";
pub const ENV_ALLOW_PLAINTEXT: &str = "OPSDESK_ALLOW_PLAINTEXT";

/// The operator-configured bypass pair checked before any store access.
#[derive(Clone, PartialEq, Eq)]
pub struct SystemCredentials {
    pub username: Username,
    pub password: String,
}

impl SystemCredentials {
    pub fn new(username: &str, password: impl Into<String>) -> Self {
        Self {
            username: Username::normalize(username),
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for SystemCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SystemCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Tier 1 is skipped when unset.
    pub system_credentials: Option<SystemCredentials>,
    /// Accept a stored value that equals the submitted password verbatim.
    ///
    /// Keeps records written before hashing usable; disabling it locks those
    /// records out until their credential is rotated.
    pub allow_plaintext_match: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            system_credentials: None,
            allow_plaintext_match: true,
        }
    }
}

impl ResolverConfig {
    pub fn with_system_credentials(mut self, credentials: SystemCredentials) -> Self {
        self.system_credentials = Some(credentials);
        self
    }

    pub fn with_plaintext_match(mut self, allow: bool) -> Self {
        self.allow_plaintext_match = allow;
        self
    }

    /// Read configuration from `OPSDESK_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let username = lookup(ENV_SYSTEM_USERNAME).filter(|v| !v.trim().is_empty());
        let password = lookup(ENV_SYSTEM_PASSWORD).filter(|v| !v.is_empty());

        let system_credentials = match (username, password) {
            (Some(u), Some(p)) => Some(SystemCredentials::new(&u, p)),
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "{ENV_SYSTEM_USERNAME} and {ENV_SYSTEM_PASSWORD} must both be set; system bypass disabled"
                );
                None
            }
        };

        let allow_plaintext_match = lookup(ENV_ALLOW_PLAINTEXT)
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Self {
            system_credentials,
            allow_plaintext_match,
        }
    }
}

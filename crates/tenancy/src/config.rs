//! Lifecycle configuration.

use tracing::warn;

use opsdesk_infra::MAX_BATCH_OPS;

pub const ENV_CASCADE_BATCH_SIZE: &str = "OPSDESK_CASCADE_BATCH_SIZE";

/// Operations per cascade commit, leaving headroom under the store cap.
pub const DEFAULT_BATCH_SIZE: usize = 450;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    pub batch_size: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl LifecycleConfig {
    /// Batch size clamped to `1..=MAX_BATCH_OPS`.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.clamp(1, MAX_BATCH_OPS),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(ENV_CASCADE_BATCH_SIZE) {
            None => Self::default(),
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) => Self::with_batch_size(n),
                Err(_) => {
                    warn!(value = %raw, "ignoring unparsable {ENV_CASCADE_BATCH_SIZE}");
                    Self::default()
                }
            },
        }
    }
}

use thiserror::Error;

use opsdesk_auth::HashError;
use opsdesk_core::DomainError;
use opsdesk_infra::StoreError;

/// Errors surfaced by lifecycle operations.
///
/// Store errors are passed through unmodified; nothing here retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Credential(#[from] HashError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

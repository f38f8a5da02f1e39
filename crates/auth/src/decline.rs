//! Decline reasons returned by credential resolution.
//!
//! Exactly one reason is reported per attempt; internal tier fall-throughs
//! are never exposed.

use serde::Serialize;
use thiserror::Error;

/// Error family of a decline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineKind {
    /// Malformed or missing input.
    Validation,
    /// A referenced tenant or unit does not exist.
    NotFound,
    /// Suspended tenant, blocked unit, or inactive identity.
    AccessDenied,
    /// No record matched the supplied credential.
    CredentialMismatch,
    /// The hashing collaborator could not execute.
    HashUnavailable,
    /// The identity store failed.
    StoreError,
}

/// Why a login attempt did not resolve to a principal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum Decline {
    #[error("username and password are required")]
    MissingCredentials,

    #[error("tenant not found")]
    TenantNotFound,

    #[error("tenant suspended")]
    TenantSuspended,

    #[error("member disabled")]
    MemberDisabled,

    #[error("unit not found")]
    UnitNotFound,

    #[error("unit blocked")]
    UnitBlocked,

    #[error("agent disabled")]
    AgentDisabled,

    #[error("admin disabled")]
    AdminDisabled,

    #[error("credential hashing is unavailable; the connection may not be secure")]
    HashUnavailable,

    #[error("tenant required")]
    TenantRequired,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("connection error: {0}")]
    ConnectionError(String),
}

impl Decline {
    pub fn kind(&self) -> DeclineKind {
        match self {
            Decline::MissingCredentials => DeclineKind::Validation,
            Decline::TenantNotFound | Decline::UnitNotFound => DeclineKind::NotFound,
            Decline::TenantSuspended
            | Decline::MemberDisabled
            | Decline::UnitBlocked
            | Decline::AgentDisabled
            | Decline::AdminDisabled => DeclineKind::AccessDenied,
            Decline::TenantRequired | Decline::InvalidCredentials => {
                DeclineKind::CredentialMismatch
            }
            Decline::HashUnavailable => DeclineKind::HashUnavailable,
            Decline::ConnectionError(_) => DeclineKind::StoreError,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Decline::MissingCredentials => "missing_credentials",
            Decline::TenantNotFound => "tenant_not_found",
            Decline::TenantSuspended => "tenant_suspended",
            Decline::MemberDisabled => "member_disabled",
            Decline::UnitNotFound => "unit_not_found",
            Decline::UnitBlocked => "unit_blocked",
            Decline::AgentDisabled => "agent_disabled",
            Decline::AdminDisabled => "admin_disabled",
            Decline::HashUnavailable => "hash_unavailable",
            Decline::TenantRequired => "tenant_required",
            Decline::InvalidCredentials => "invalid_credentials",
            Decline::ConnectionError(_) => "connection_error",
        }
    }
}

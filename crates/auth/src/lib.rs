//! `opsdesk-auth`: credential resolution and authorization.
//!
//! Turns raw `(tenant, username, password)` input into exactly one
//! [`ResolvedPrincipal`] or one [`Decline`] reason. Storage is reached only
//! through the `IdentityStore` contract and hashing only through
//! [`CredentialHasher`]; nothing here knows about HTTP or sessions.

pub mod authorize;
pub mod config;
pub mod credential;
pub mod decline;
pub mod hasher;
pub mod principal;
pub mod resolver;
pub mod roles;

pub use authorize::{AuthzError, Capability, authorize};
pub use config::{ResolverConfig, SystemCredentials};
pub use credential::{CredentialVerifier, HASHED_MIN_LEN, StoredCredential, is_hashed, prepare_credential};
pub use decline::{Decline, DeclineKind};
pub use hasher::{CredentialHasher, HashError, Sha256Hasher, UnavailableHasher};
pub use principal::ResolvedPrincipal;
pub use resolver::{
    CredentialResolver, LoginInput, ResolutionContext, ResolutionTier, TierOutcome,
    standard_tiers,
};
pub use roles::Role;

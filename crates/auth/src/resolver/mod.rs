//! Ordered multi-tier credential resolution.
//!
//! ## Resolution Flow
//!
//! ```text
//! (tenant, username, password)
//!   ↓ normalize (tenant upper-case, username lower-case, both trimmed)
//! tier 1 … tier 7, in order
//!   ├─ Match(principal) → stop, resolved
//!   ├─ Decline(reason)  → stop, declined (terminal, no fall-through)
//!   └─ NoMatch          → next tier
//!   ↓ all tiers NoMatch
//! final decline: hash unavailable > tenant required > invalid credentials
//! ```
//!
//! Store failures stop resolution with [`Decline::ConnectionError`]; they are
//! never reported as a credential mismatch.

pub mod tiers;

use tracing::{debug, warn};

use opsdesk_core::{TenantCode, Username};
use opsdesk_infra::{IdentityStore, StoreError};

use crate::config::ResolverConfig;
use crate::credential::CredentialVerifier;
use crate::hasher::CredentialHasher;
use crate::{Decline, ResolvedPrincipal};

pub use tiers::{
    LegacyTenantAdminTier, LegacyUnitAdminTier, SuperAdminTier, SupportAgentTier,
    SystemBypassTier, TeamMemberTier, TenantMemberTier,
};

/// Normalized login input.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginInput {
    pub tenant: Option<TenantCode>,
    pub username: Username,
    pub password: String,
}

impl LoginInput {
    /// Normalize raw input. An empty `tenant_raw` means no tenant context.
    pub fn new(tenant_raw: &str, username_raw: &str, password: &str) -> Result<Self, Decline> {
        let username = Username::normalize(username_raw);
        if username.is_empty() || password.is_empty() {
            return Err(Decline::MissingCredentials);
        }
        Ok(Self {
            tenant: TenantCode::from_input(tenant_raw),
            username,
            password: password.to_string(),
        })
    }
}

impl core::fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginInput")
            .field("tenant", &self.tenant)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Three-way result of a single tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    Match(ResolvedPrincipal),
    Decline(Decline),
    NoMatch,
}

/// State shared by the tiers of one resolution attempt.
pub struct ResolutionContext<'a> {
    pub store: &'a dyn IdentityStore,
    pub login: &'a LoginInput,
    verifier: CredentialVerifier<'a>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        store: &'a dyn IdentityStore,
        hasher: &'a dyn CredentialHasher,
        login: &'a LoginInput,
        allow_plaintext: bool,
    ) -> Self {
        Self {
            store,
            login,
            verifier: CredentialVerifier::new(hasher, allow_plaintext),
        }
    }

    /// Check the submitted password against a stored credential.
    pub fn credential_matches(&mut self, stored: &str, salt: &str) -> bool {
        self.verifier.matches(&self.login.password, stored, salt)
    }

    /// Decline reported when every tier fell through.
    pub fn final_decline(&self) -> Decline {
        if self.verifier.hash_unavailable() {
            Decline::HashUnavailable
        } else if self.login.tenant.is_none() {
            Decline::TenantRequired
        } else {
            Decline::InvalidCredentials
        }
    }
}

/// One lookup strategy in the resolution chain.
///
/// Return `NoMatch` only when no candidate record was found or its
/// credential did not match; policy denials must be `Decline`.
#[async_trait::async_trait]
pub trait ResolutionTier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, ctx: &mut ResolutionContext<'_>) -> Result<TierOutcome, StoreError>;
}

/// The standard seven tiers, in resolution order.
pub fn standard_tiers(config: &ResolverConfig) -> Vec<Box<dyn ResolutionTier>> {
    vec![
        Box::new(SystemBypassTier::new(config.system_credentials.clone())),
        Box::new(TenantMemberTier),
        Box::new(LegacyTenantAdminTier),
        Box::new(LegacyUnitAdminTier),
        Box::new(TeamMemberTier),
        Box::new(SupportAgentTier),
        Box::new(SuperAdminTier),
    ]
}

/// Resolves raw login input to exactly one principal or one decline reason.
///
/// Holds no mutable state; concurrent calls are independent.
pub struct CredentialResolver<S, H> {
    store: S,
    hasher: H,
    config: ResolverConfig,
    tiers: Vec<Box<dyn ResolutionTier>>,
}

impl<S, H> CredentialResolver<S, H>
where
    S: IdentityStore,
    H: CredentialHasher,
{
    pub fn new(store: S, hasher: H, config: ResolverConfig) -> Self {
        let tiers = standard_tiers(&config);
        Self::with_tiers(store, hasher, config, tiers)
    }

    /// Build a resolver with an explicit tier chain.
    pub fn with_tiers(
        store: S,
        hasher: H,
        config: ResolverConfig,
        tiers: Vec<Box<dyn ResolutionTier>>,
    ) -> Self {
        Self {
            store,
            hasher,
            config,
            tiers,
        }
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve raw `(tenant, username, password)` input.
    pub async fn resolve(
        &self,
        tenant_raw: &str,
        username_raw: &str,
        password: &str,
    ) -> Result<ResolvedPrincipal, Decline> {
        let login = LoginInput::new(tenant_raw, username_raw, password)?;
        self.resolve_login(&login).await
    }

    pub async fn resolve_login(&self, login: &LoginInput) -> Result<ResolvedPrincipal, Decline> {
        let mut ctx = ResolutionContext::new(
            &self.store,
            &self.hasher,
            login,
            self.config.allow_plaintext_match,
        );

        for tier in &self.tiers {
            match tier.attempt(&mut ctx).await {
                Ok(TierOutcome::Match(principal)) => {
                    debug!(
                        tier = tier.name(),
                        role = %principal.role,
                        tenant_id = ?principal.tenant_id,
                        "login resolved"
                    );
                    return Ok(principal);
                }
                Ok(TierOutcome::Decline(decline)) => {
                    debug!(tier = tier.name(), reason = decline.code(), "login declined");
                    return Err(decline);
                }
                Ok(TierOutcome::NoMatch) => continue,
                Err(err) => {
                    warn!(tier = tier.name(), error = %err, "identity store failed during login");
                    return Err(Decline::ConnectionError(err.to_string()));
                }
            }
        }

        let decline = ctx.final_decline();
        debug!(reason = decline.code(), "login fell through every tier");
        Err(decline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use crate::hasher::Sha256Hasher;
    use opsdesk_infra::InMemoryIdentityStore;

    struct Fixed(&'static str, TierOutcome);

    #[async_trait::async_trait]
    impl ResolutionTier for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn attempt(
            &self,
            _ctx: &mut ResolutionContext<'_>,
        ) -> Result<TierOutcome, StoreError> {
            Ok(self.1.clone())
        }
    }

    struct Broken;

    #[async_trait::async_trait]
    impl ResolutionTier for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn attempt(
            &self,
            _ctx: &mut ResolutionContext<'_>,
        ) -> Result<TierOutcome, StoreError> {
            Err(StoreError::PermissionDenied("rules".to_string()))
        }
    }

    fn principal(name: &str) -> ResolvedPrincipal {
        ResolvedPrincipal::new(Role::SupportAgent, Username::normalize(name), name)
    }

    fn resolver(tiers: Vec<Box<dyn ResolutionTier>>) -> CredentialResolver<InMemoryIdentityStore, Sha256Hasher> {
        CredentialResolver::with_tiers(
            InMemoryIdentityStore::new(),
            Sha256Hasher,
            ResolverConfig::default(),
            tiers,
        )
    }

    #[test]
    fn standard_chain_order() {
        let r = CredentialResolver::new(
            InMemoryIdentityStore::new(),
            Sha256Hasher,
            ResolverConfig::default(),
        );
        assert_eq!(
            r.tier_names(),
            vec![
                "system_bypass",
                "tenant_member",
                "legacy_tenant_admin",
                "legacy_unit_admin",
                "team_member",
                "support_agent",
                "super_admin",
            ]
        );
    }

    #[tokio::test]
    async fn first_match_wins() {
        let r = resolver(vec![
            Box::new(Fixed("a", TierOutcome::NoMatch)),
            Box::new(Fixed("b", TierOutcome::Match(principal("first")))),
            Box::new(Fixed("c", TierOutcome::Match(principal("second")))),
        ]);
        let resolved = r.resolve("ACME01", "x", "pw").await.unwrap();
        assert_eq!(resolved.display_name, "first");
    }

    #[tokio::test]
    async fn decline_is_terminal() {
        let r = resolver(vec![
            Box::new(Fixed("a", TierOutcome::Decline(Decline::UnitBlocked))),
            Box::new(Fixed("b", TierOutcome::Match(principal("later")))),
        ]);
        assert_eq!(r.resolve("ACME01", "x", "pw").await, Err(Decline::UnitBlocked));
    }

    #[tokio::test]
    async fn store_failure_is_a_connection_error() {
        let r = resolver(vec![
            Box::new(Broken),
            Box::new(Fixed("b", TierOutcome::Match(principal("later")))),
        ]);
        let decline = r.resolve("ACME01", "x", "pw").await.unwrap_err();
        assert!(matches!(decline, Decline::ConnectionError(_)));
    }

    #[tokio::test]
    async fn fallthrough_reason_depends_on_tenant_context() {
        let r = resolver(vec![Box::new(Fixed("a", TierOutcome::NoMatch))]);
        assert_eq!(r.resolve("", "x", "pw").await, Err(Decline::TenantRequired));
        assert_eq!(
            r.resolve("ACME01", "x", "pw").await,
            Err(Decline::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_any_tier() {
        let r = resolver(vec![Box::new(Broken)]);
        assert_eq!(r.resolve("ACME01", "   ", "pw").await, Err(Decline::MissingCredentials));
        assert_eq!(r.resolve("ACME01", "adm", "").await, Err(Decline::MissingCredentials));
    }
}

//! The seven standard resolution tiers.

use serde_json::Value;

use opsdesk_core::{
    SuperAdminAgent, SupportAgent, Tenant, TenantCode, TenantMember, Unit, UnitConfig, UnitId,
};
use opsdesk_infra::collections::{
    COMPANIES, COMPANY_USERS, FIELD_COMPANY_ID, STORE_CONFIGS, STORES, SUPER_ADMINS,
    SUPPORT_AGENTS,
};
use opsdesk_infra::{IdentityStoreExt, Keyed, StoreError};

use super::{ResolutionContext, ResolutionTier, TierOutcome};
use crate::config::SystemCredentials;
use crate::{Decline, ResolvedPrincipal, Role};

async fn load_tenant(
    ctx: &ResolutionContext<'_>,
    code: &TenantCode,
) -> Result<Option<Tenant>, StoreError> {
    let tenant: Option<Tenant> = ctx.store.get_record(COMPANIES, code.as_str()).await?;
    Ok(tenant.map(|mut t| {
        t.id = code.clone();
        t
    }))
}

async fn load_unit(ctx: &ResolutionContext<'_>, id: &UnitId) -> Result<Option<Unit>, StoreError> {
    let unit: Option<Unit> = ctx.store.get_record(STORES, id.as_str()).await?;
    Ok(unit.map(|mut u| {
        u.id = id.clone();
        u
    }))
}

/// Member records are keyed by tenant and username; both are taken from the
/// key rather than the document body.
async fn load_member(
    ctx: &ResolutionContext<'_>,
    code: &TenantCode,
) -> Result<Option<TenantMember>, StoreError> {
    let key = TenantMember::key(code, &ctx.login.username);
    let member: Option<TenantMember> = ctx.store.get_record(COMPANY_USERS, &key).await?;
    Ok(member.map(|mut m| {
        m.company_id = code.clone();
        m.username = ctx.login.username.to_string();
        m
    }))
}

async fn load_support_agent(
    ctx: &ResolutionContext<'_>,
) -> Result<Option<SupportAgent>, StoreError> {
    let username = &ctx.login.username;
    let agent: Option<SupportAgent> =
        ctx.store.get_record(SUPPORT_AGENTS, username.as_str()).await?;
    Ok(agent.map(|mut a| {
        a.username = username.to_string();
        a
    }))
}

async fn load_super_admin(
    ctx: &ResolutionContext<'_>,
) -> Result<Option<SuperAdminAgent>, StoreError> {
    let username = &ctx.login.username;
    let admin: Option<SuperAdminAgent> =
        ctx.store.get_record(SUPER_ADMINS, username.as_str()).await?;
    Ok(admin.map(|mut a| {
        a.username = username.to_string();
        a
    }))
}

/// Units owned by `code`, in store order.
async fn tenant_units(
    ctx: &ResolutionContext<'_>,
    code: &TenantCode,
) -> Result<Vec<Unit>, StoreError> {
    let docs: Vec<Keyed<Unit>> = ctx
        .store
        .query_records(STORES, FIELD_COMPANY_ID, &Value::from(code.as_str()))
        .await?;
    Ok(docs
        .into_iter()
        .map(|keyed| {
            let mut unit = keyed.record;
            unit.id = UnitId::new(keyed.key);
            unit
        })
        .collect())
}

/// A unit bound to a principal must exist under the same tenant and not be
/// blocked.
fn check_bound_unit(unit: Option<&Unit>, tenant: &TenantCode) -> Option<Decline> {
    match unit {
        None => Some(Decline::UnitNotFound),
        Some(u) if &u.company_id != tenant => Some(Decline::UnitNotFound),
        Some(u) if u.is_blocked => Some(Decline::UnitBlocked),
        Some(_) => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tier 1: system bypass
// ─────────────────────────────────────────────────────────────────────────────

/// Operator-configured credential pair. Needs no store access.
#[derive(Debug, Clone, Default)]
pub struct SystemBypassTier {
    credentials: Option<SystemCredentials>,
}

impl SystemBypassTier {
    pub fn new(credentials: Option<SystemCredentials>) -> Self {
        Self { credentials }
    }
}

#[async_trait::async_trait]
impl ResolutionTier for SystemBypassTier {
    fn name(&self) -> &'static str {
        "system_bypass"
    }

    async fn attempt(&self, ctx: &mut ResolutionContext<'_>) -> Result<TierOutcome, StoreError> {
        let Some(creds) = &self.credentials else {
            return Ok(TierOutcome::NoMatch);
        };
        if creds.username != ctx.login.username || creds.password != ctx.login.password {
            return Ok(TierOutcome::NoMatch);
        }
        Ok(TierOutcome::Match(ResolvedPrincipal::new(
            Role::SystemAdmin,
            ctx.login.username.clone(),
            "System Administrator",
        )))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tier 2: tenant member
// ─────────────────────────────────────────────────────────────────────────────

/// Tenant-scoped member records keyed by `"{tenant}__{username}"`.
///
/// Also the gate for tenant validity: a missing or suspended tenant ends
/// resolution here.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantMemberTier;

#[async_trait::async_trait]
impl ResolutionTier for TenantMemberTier {
    fn name(&self) -> &'static str {
        "tenant_member"
    }

    async fn attempt(&self, ctx: &mut ResolutionContext<'_>) -> Result<TierOutcome, StoreError> {
        let login = ctx.login;
        let Some(code) = &login.tenant else {
            return Ok(TierOutcome::NoMatch);
        };

        let Some(tenant) = load_tenant(ctx, code).await? else {
            return Ok(TierOutcome::Decline(Decline::TenantNotFound));
        };
        if tenant.is_suspended {
            return Ok(TierOutcome::Decline(Decline::TenantSuspended));
        }

        let Some(member) = load_member(ctx, code).await? else {
            return Ok(TierOutcome::NoMatch);
        };
        if !member.is_active {
            return Ok(TierOutcome::Decline(Decline::MemberDisabled));
        }
        if !ctx.credential_matches(&member.password, &member.password_salt) {
            return Ok(TierOutcome::NoMatch);
        }

        if let Some(unit_id) = &member.store_id {
            let unit = load_unit(ctx, unit_id).await?;
            if let Some(decline) = check_bound_unit(unit.as_ref(), code) {
                return Ok(TierOutcome::Decline(decline));
            }
        }

        Ok(TierOutcome::Match(
            ResolvedPrincipal::new(member.role.into(), ctx.login.username.clone(), member.name)
                .with_tenant(Some(code.clone()))
                .with_unit(member.store_id),
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tier 3: legacy tenant admin
// ─────────────────────────────────────────────────────────────────────────────

/// The administrative credential stored on the tenant record itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyTenantAdminTier;

#[async_trait::async_trait]
impl ResolutionTier for LegacyTenantAdminTier {
    fn name(&self) -> &'static str {
        "legacy_tenant_admin"
    }

    async fn attempt(&self, ctx: &mut ResolutionContext<'_>) -> Result<TierOutcome, StoreError> {
        let login = ctx.login;
        let Some(code) = &login.tenant else {
            return Ok(TierOutcome::NoMatch);
        };
        let Some(tenant) = load_tenant(ctx, code).await? else {
            return Ok(TierOutcome::NoMatch);
        };
        if !login.username.matches(&tenant.admin_username)
            || !ctx.credential_matches(&tenant.admin_password, &tenant.password_salt)
        {
            return Ok(TierOutcome::NoMatch);
        }
        if tenant.is_suspended {
            return Ok(TierOutcome::Decline(Decline::TenantSuspended));
        }

        Ok(TierOutcome::Match(
            ResolvedPrincipal::new(
                Role::TenantAdmin,
                ctx.login.username.clone(),
                tenant.admin_display_name(),
            )
            .with_tenant(Some(code.clone())),
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tier 4: legacy unit admin
// ─────────────────────────────────────────────────────────────────────────────

/// The administrative credential stored on a unit record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyUnitAdminTier;

#[async_trait::async_trait]
impl ResolutionTier for LegacyUnitAdminTier {
    fn name(&self) -> &'static str {
        "legacy_unit_admin"
    }

    async fn attempt(&self, ctx: &mut ResolutionContext<'_>) -> Result<TierOutcome, StoreError> {
        let login = ctx.login;
        let Some(code) = &login.tenant else {
            return Ok(TierOutcome::NoMatch);
        };
        let units = tenant_units(ctx, code).await?;
        let Some(unit) = units
            .into_iter()
            .find(|u| login.username.matches(&u.admin_username))
        else {
            return Ok(TierOutcome::NoMatch);
        };
        if unit.is_blocked {
            return Ok(TierOutcome::Decline(Decline::UnitBlocked));
        }
        if !ctx.credential_matches(&unit.admin_password, &unit.password_salt) {
            return Ok(TierOutcome::NoMatch);
        }

        let name = unit.admin_display_name().to_string();
        Ok(TierOutcome::Match(
            ResolvedPrincipal::new(Role::UnitAdmin, ctx.login.username.clone(), name)
                .with_tenant(Some(code.clone()))
                .with_unit(Some(unit.id)),
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tier 5: team member embedded in a unit config
// ─────────────────────────────────────────────────────────────────────────────

/// Team lists embedded in each unit's config. The first unit (in store
/// order) listing the username wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamMemberTier;

#[async_trait::async_trait]
impl ResolutionTier for TeamMemberTier {
    fn name(&self) -> &'static str {
        "team_member"
    }

    async fn attempt(&self, ctx: &mut ResolutionContext<'_>) -> Result<TierOutcome, StoreError> {
        let login = ctx.login;
        let Some(code) = &login.tenant else {
            return Ok(TierOutcome::NoMatch);
        };

        let mut found = None;
        for host in tenant_units(ctx, code).await? {
            let config: Option<UnitConfig> =
                ctx.store.get_record(STORE_CONFIGS, host.id.as_str()).await?;
            if let Some(member) = config
                .as_ref()
                .and_then(|c| c.find_member(&login.username))
            {
                found = Some((host, member.clone()));
                break;
            }
        }
        let Some((host, member)) = found else {
            return Ok(TierOutcome::NoMatch);
        };

        let owner = match &member.store_id {
            Some(id) if *id != host.id => load_unit(ctx, id).await?,
            _ => Some(host),
        };
        if let Some(decline) = check_bound_unit(owner.as_ref(), code) {
            return Ok(TierOutcome::Decline(decline));
        }
        if !ctx.credential_matches(&member.password, &member.password_salt) {
            return Ok(TierOutcome::NoMatch);
        }

        Ok(TierOutcome::Match(
            ResolvedPrincipal::new(Role::TeamMember, ctx.login.username.clone(), member.name)
                .with_tenant(Some(code.clone()))
                .with_unit(owner.map(|u| u.id)),
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tier 6/7: global agents
// ─────────────────────────────────────────────────────────────────────────────

/// Support agents, looked up by username regardless of tenant context.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupportAgentTier;

#[async_trait::async_trait]
impl ResolutionTier for SupportAgentTier {
    fn name(&self) -> &'static str {
        "support_agent"
    }

    async fn attempt(&self, ctx: &mut ResolutionContext<'_>) -> Result<TierOutcome, StoreError> {
        let Some(agent) = load_support_agent(ctx).await? else {
            return Ok(TierOutcome::NoMatch);
        };
        if !agent.is_active {
            return Ok(TierOutcome::Decline(Decline::AgentDisabled));
        }
        if !ctx.credential_matches(&agent.password, &agent.password_salt) {
            return Ok(TierOutcome::NoMatch);
        }

        Ok(TierOutcome::Match(
            ResolvedPrincipal::new(Role::SupportAgent, ctx.login.username.clone(), agent.name)
                .with_tenant(agent.company_id)
                .with_support_capability(agent.can_create_company),
        ))
    }
}

/// Dynamically provisioned system administrators.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperAdminTier;

#[async_trait::async_trait]
impl ResolutionTier for SuperAdminTier {
    fn name(&self) -> &'static str {
        "super_admin"
    }

    async fn attempt(&self, ctx: &mut ResolutionContext<'_>) -> Result<TierOutcome, StoreError> {
        let Some(admin) = load_super_admin(ctx).await? else {
            return Ok(TierOutcome::NoMatch);
        };
        if !admin.is_active {
            return Ok(TierOutcome::Decline(Decline::AdminDisabled));
        }
        if !ctx.credential_matches(&admin.password, &admin.password_salt) {
            return Ok(TierOutcome::NoMatch);
        }

        Ok(TierOutcome::Match(ResolvedPrincipal::new(
            Role::SystemAdmin,
            ctx.login.username.clone(),
            admin.name,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::{CredentialHasher, Sha256Hasher};
    use crate::resolver::LoginInput;
    use opsdesk_infra::InMemoryIdentityStore;
    use serde_json::json;

    const SALT: &str = "00112233445566778899aabbccddeeff";

    fn hashed(password: &str) -> String {
        Sha256Hasher.hash(password, SALT).unwrap()
    }

    fn store() -> InMemoryIdentityStore {
        let store = InMemoryIdentityStore::new();
        store
            .insert(
                COMPANIES,
                "ACME01",
                json!({"id": "ACME01", "name": "Acme", "adminUsername": "owner", "adminPassword": hashed("ownerpw"), "passwordSalt": SALT}),
            )
            .unwrap();
        store
            .insert(
                STORES,
                "u1",
                json!({"companyId": "ACME01", "name": "Main", "adminUsername": "manager", "adminPassword": "managerpw", "adminName": "Mia"}),
            )
            .unwrap();
        store
            .insert(
                STORES,
                "u2",
                json!({"companyId": "ACME01", "name": "Annex", "adminUsername": "closed", "adminPassword": "pw1234", "isBlocked": true}),
            )
            .unwrap();
        store
            .insert(
                STORE_CONFIGS,
                "u1",
                json!({"teamMembers": [{"username": "Cashier", "name": "Cass", "password": hashed("till"), "passwordSalt": SALT}]}),
            )
            .unwrap();
        store
    }

    async fn run(tier: &dyn ResolutionTier, store: &InMemoryIdentityStore, login: &LoginInput) -> TierOutcome {
        let mut ctx = ResolutionContext::new(store, &Sha256Hasher, login, true);
        tier.attempt(&mut ctx).await.unwrap()
    }

    fn login(tenant: &str, user: &str, pw: &str) -> LoginInput {
        LoginInput::new(tenant, user, pw).unwrap()
    }

    #[tokio::test]
    async fn system_bypass_compares_normalized_username_and_exact_password() {
        let store = InMemoryIdentityStore::new();
        let tier = SystemBypassTier::new(Some(SystemCredentials::new("root", "s3cret")));

        let hit = run(&tier, &store, &login("", "  ROOT ", "s3cret")).await;
        assert!(matches!(hit, TierOutcome::Match(p) if p.role == Role::SystemAdmin && p.tenant_id.is_none()));

        let miss = run(&tier, &store, &login("", "root", "S3CRET")).await;
        assert_eq!(miss, TierOutcome::NoMatch);

        let off = run(&SystemBypassTier::default(), &store, &login("", "root", "s3cret")).await;
        assert_eq!(off, TierOutcome::NoMatch);
    }

    #[tokio::test]
    async fn tenant_member_declines_unknown_tenant() {
        let store = store();
        let outcome = run(&TenantMemberTier, &store, &login("nope01", "x", "y")).await;
        assert_eq!(outcome, TierOutcome::Decline(Decline::TenantNotFound));
    }

    #[tokio::test]
    async fn tenant_member_binds_unit_and_checks_it() {
        let store = store();
        store
            .insert(
                COMPANY_USERS,
                "ACME01__lead",
                json!({"companyId": "ACME01", "username": "lead", "name": "Lee", "password": "leadpw", "role": "storeAdmin", "storeId": "u2"}),
            )
            .unwrap();
        let outcome = run(&TenantMemberTier, &store, &login("acme01", "lead", "leadpw")).await;
        assert_eq!(outcome, TierOutcome::Decline(Decline::UnitBlocked));

        let outcome = run(&TenantMemberTier, &store, &login("acme01", "lead", "wrong")).await;
        assert_eq!(outcome, TierOutcome::NoMatch);
    }

    #[tokio::test]
    async fn tenant_member_bound_to_missing_or_foreign_unit_is_terminal() {
        let store = store();
        store.insert(COMPANIES, "OTHER1", json!({"id": "OTHER1", "name": "Other"})).unwrap();
        store.insert(STORES, "x1", json!({"companyId": "OTHER1", "name": "Elsewhere"})).unwrap();
        store
            .insert(
                COMPANY_USERS,
                "ACME01__ghost",
                json!({"password": "pw1234", "role": "storeAdmin", "storeId": "missing"}),
            )
            .unwrap();
        store
            .insert(
                COMPANY_USERS,
                "ACME01__stray",
                json!({"password": "pw1234", "role": "storeAdmin", "storeId": "x1"}),
            )
            .unwrap();

        let missing = run(&TenantMemberTier, &store, &login("ACME01", "ghost", "pw1234")).await;
        assert_eq!(missing, TierOutcome::Decline(Decline::UnitNotFound));

        let foreign = run(&TenantMemberTier, &store, &login("ACME01", "stray", "pw1234")).await;
        assert_eq!(foreign, TierOutcome::Decline(Decline::UnitNotFound));
    }

    #[tokio::test]
    async fn tenant_member_without_key_fields_in_body_resolves() {
        let store = store();
        store
            .insert(
                COMPANY_USERS,
                "ACME01__lee",
                json!({"name": "Lee", "password": "lee-pass", "role": "companyAdmin"}),
            )
            .unwrap();

        let ok = run(&TenantMemberTier, &store, &login("acme01", "Lee", "lee-pass")).await;
        let TierOutcome::Match(p) = ok else {
            panic!("expected match, got {ok:?}");
        };
        assert_eq!(p.role, Role::TenantAdmin);
        assert_eq!(p.tenant_id, Some(TenantCode::parse("ACME01").unwrap()));
        assert_eq!(p.display_name, "Lee");
    }

    #[tokio::test]
    async fn tenant_member_inactive_is_terminal() {
        let store = store();
        store
            .insert(
                COMPANY_USERS,
                "ACME01__gone",
                json!({"companyId": "ACME01", "username": "gone", "password": "pw1234", "isActive": false}),
            )
            .unwrap();
        let outcome = run(&TenantMemberTier, &store, &login("ACME01", "gone", "pw1234")).await;
        assert_eq!(outcome, TierOutcome::Decline(Decline::MemberDisabled));
    }

    #[tokio::test]
    async fn legacy_tenant_admin_matches_hashed_credential() {
        let store = store();
        let outcome = run(&LegacyTenantAdminTier, &store, &login("ACME01", "Owner", "ownerpw")).await;
        let TierOutcome::Match(p) = outcome else {
            panic!("expected match, got {outcome:?}");
        };
        assert_eq!(p.role, Role::TenantAdmin);
        assert_eq!(p.display_name, "Acme");
        assert_eq!(p.tenant_id, Some(TenantCode::parse("ACME01").unwrap()));
    }

    #[tokio::test]
    async fn legacy_unit_admin_blocked_unit_is_terminal_but_wrong_password_falls_through() {
        let store = store();
        let blocked = run(&LegacyUnitAdminTier, &store, &login("ACME01", "closed", "pw1234")).await;
        assert_eq!(blocked, TierOutcome::Decline(Decline::UnitBlocked));

        let wrong = run(&LegacyUnitAdminTier, &store, &login("ACME01", "manager", "nope")).await;
        assert_eq!(wrong, TierOutcome::NoMatch);

        let ok = run(&LegacyUnitAdminTier, &store, &login("ACME01", "manager", "managerpw")).await;
        let TierOutcome::Match(p) = ok else {
            panic!("expected match, got {ok:?}");
        };
        assert_eq!(p.role, Role::UnitAdmin);
        assert_eq!(p.display_name, "Mia");
        assert_eq!(p.unit_id, Some(UnitId::from("u1")));
    }

    #[tokio::test]
    async fn team_member_found_in_unit_config() {
        let store = store();
        let ok = run(&TeamMemberTier, &store, &login("ACME01", "cashier", "till")).await;
        let TierOutcome::Match(p) = ok else {
            panic!("expected match, got {ok:?}");
        };
        assert_eq!(p.role, Role::TeamMember);
        assert_eq!(p.display_name, "Cass");
        assert_eq!(p.unit_id, Some(UnitId::from("u1")));
    }

    #[tokio::test]
    async fn team_member_first_unit_in_key_order_wins() {
        let store = store();
        store
            .insert(STORES, "u3", json!({"companyId": "ACME01", "name": "Outlet"}))
            .unwrap();
        store
            .insert(
                STORE_CONFIGS,
                "u3",
                json!({"teamMembers": [{"username": "cashier", "name": "Other Cass", "password": "outletpw"}]}),
            )
            .unwrap();

        let ok = run(&TeamMemberTier, &store, &login("ACME01", "cashier", "till")).await;
        let TierOutcome::Match(p) = ok else {
            panic!("expected match, got {ok:?}");
        };
        assert_eq!(p.display_name, "Cass");
        assert_eq!(p.unit_id, Some(UnitId::from("u1")));

        // The later unit's credential is never consulted.
        let later = run(&TeamMemberTier, &store, &login("ACME01", "cashier", "outletpw")).await;
        assert_eq!(later, TierOutcome::NoMatch);
    }

    #[tokio::test]
    async fn null_unit_fields_do_not_break_unit_scans() {
        let store = store();
        store
            .insert(
                STORES,
                "u0",
                json!({"companyId": "ACME01", "name": "Depot", "adminName": null, "isBlocked": null, "adminUsername": null}),
            )
            .unwrap();
        store
            .insert(STORE_CONFIGS, "u0", json!({"storeId": "u0", "teamMembers": null}))
            .unwrap();

        let admin = run(&LegacyUnitAdminTier, &store, &login("ACME01", "manager", "managerpw")).await;
        assert!(matches!(admin, TierOutcome::Match(p) if p.unit_id == Some(UnitId::from("u1"))));

        let member = run(&TeamMemberTier, &store, &login("ACME01", "cashier", "till")).await;
        assert!(matches!(member, TierOutcome::Match(p) if p.unit_id == Some(UnitId::from("u1"))));
    }

    #[tokio::test]
    async fn team_member_bound_to_missing_unit_is_terminal() {
        let store = store();
        store
            .insert(
                STORE_CONFIGS,
                "u1",
                json!({"teamMembers": [{"username": "drifter", "password": "pw1234", "storeId": "ghost"}]}),
            )
            .unwrap();
        let outcome = run(&TeamMemberTier, &store, &login("ACME01", "drifter", "pw1234")).await;
        assert_eq!(outcome, TierOutcome::Decline(Decline::UnitNotFound));
    }

    #[tokio::test]
    async fn support_agent_carries_capability_and_default_tenant() {
        let store = InMemoryIdentityStore::new();
        store
            .insert(
                SUPPORT_AGENTS,
                "helper",
                json!({"username": "helper", "name": "Hal", "password": "helppw", "companyId": "ACME01", "canCreateCompany": true}),
            )
            .unwrap();
        let ok = run(&SupportAgentTier, &store, &login("", "helper", "helppw")).await;
        let TierOutcome::Match(p) = ok else {
            panic!("expected match, got {ok:?}");
        };
        assert_eq!(p.role, Role::SupportAgent);
        assert_eq!(p.can_create_tenant, Some(true));
        assert_eq!(p.tenant_id, Some(TenantCode::parse("ACME01").unwrap()));
    }

    #[tokio::test]
    async fn super_admin_inactive_is_terminal() {
        let store = InMemoryIdentityStore::new();
        store
            .insert(
                SUPER_ADMINS,
                "boss",
                json!({"username": "boss", "password": "bosspw", "isActive": false}),
            )
            .unwrap();
        let outcome = run(&SuperAdminTier, &store, &login("", "boss", "bosspw")).await;
        assert_eq!(outcome, TierOutcome::Decline(Decline::AdminDisabled));
    }

    #[tokio::test]
    async fn global_agents_keyed_by_username_need_no_username_field() {
        let store = InMemoryIdentityStore::new();
        store
            .insert(SUPPORT_AGENTS, "helper", json!({"password": "help-pass", "isActive": true}))
            .unwrap();
        store
            .insert(SUPER_ADMINS, "boss", json!({"name": null, "password": "boss-pass", "isActive": null}))
            .unwrap();

        let support = run(&SupportAgentTier, &store, &login("", "Helper", "help-pass")).await;
        assert!(matches!(support, TierOutcome::Match(p) if p.role == Role::SupportAgent));

        let admin = run(&SuperAdminTier, &store, &login("", "boss", "boss-pass")).await;
        let TierOutcome::Match(p) = admin else {
            panic!("expected match, got {admin:?}");
        };
        assert_eq!(p.role, Role::SystemAdmin);
        assert_eq!(p.username.as_str(), "boss");
    }
}

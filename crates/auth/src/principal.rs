use serde::{Deserialize, Serialize};

use opsdesk_core::{AdminScope, TenantCode, UnitId, Username};

use crate::Role;

/// Outcome of a successful credential resolution.
///
/// Transient: the resolver never persists it. Session issuance is the
/// caller's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrincipal {
    pub role: Role,
    pub username: Username,
    pub display_name: String,
    pub tenant_id: Option<TenantCode>,
    pub unit_id: Option<UnitId>,
    /// Only set for support agents.
    pub can_create_tenant: Option<bool>,
}

impl ResolvedPrincipal {
    pub fn new(role: Role, username: Username, display_name: impl Into<String>) -> Self {
        Self {
            role,
            username,
            display_name: display_name.into(),
            tenant_id: None,
            unit_id: None,
            can_create_tenant: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: Option<TenantCode>) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn with_unit(mut self, unit_id: Option<UnitId>) -> Self {
        self.unit_id = unit_id;
        self
    }

    pub fn with_support_capability(mut self, can_create_tenant: bool) -> Self {
        self.can_create_tenant = Some(can_create_tenant);
        self
    }

    /// Administrative mode this principal operates in, if any.
    pub fn admin_scope(&self) -> Option<AdminScope> {
        match self.role {
            Role::SystemAdmin => Some(AdminScope::System),
            Role::SupportAgent => Some(match &self.tenant_id {
                Some(tenant) => AdminScope::Tenant(tenant.clone()),
                None => AdminScope::Support,
            }),
            Role::TenantAdmin => self.tenant_id.clone().map(AdminScope::Tenant),
            Role::UnitAdmin | Role::TeamMember => None,
        }
    }
}

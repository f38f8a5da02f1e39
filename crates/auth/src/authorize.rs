use thiserror::Error;

use opsdesk_core::{AdminScope, TenantCode, UnitId};

use crate::{ResolvedPrincipal, Role};

/// An action a resolved principal may attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Suspend, reactivate or delete any tenant.
    ManageTenants,
    /// Provision a new tenant.
    CreateTenant,
    /// Administer the records of one tenant.
    AdministerTenant(TenantCode),
    /// Administer one unit of one tenant.
    AdministerUnit(TenantCode, UnitId),
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageTenants => "tenants.manage",
            Capability::CreateTenant => "tenants.create",
            Capability::AdministerTenant(_) => "tenant.administer",
            Capability::AdministerUnit(..) => "unit.administer",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: missing capability '{0}'")]
    Forbidden(String),
}

/// Authorize a principal for a capability.
///
/// - No IO
/// - No panics
/// - Tenant-bound principals acting on another tenant get `TenantMismatch`
pub fn authorize(principal: &ResolvedPrincipal, required: &Capability) -> Result<(), AuthzError> {
    let forbidden = || Err(AuthzError::Forbidden(required.as_str().to_string()));
    let scope = principal.admin_scope();

    match required {
        Capability::ManageTenants => match scope {
            Some(AdminScope::System | AdminScope::Support) => Ok(()),
            _ => forbidden(),
        },
        Capability::CreateTenant => {
            let allowed = principal.role == Role::SystemAdmin
                || principal.can_create_tenant == Some(true);
            if allowed { Ok(()) } else { forbidden() }
        }
        Capability::AdministerTenant(tenant) => check_tenant(principal, scope, tenant, forbidden),
        Capability::AdministerUnit(tenant, unit) => {
            if principal.role == Role::UnitAdmin {
                if principal.tenant_id.as_ref() != Some(tenant) {
                    return Err(AuthzError::TenantMismatch);
                }
                return if principal.unit_id.as_ref() == Some(unit) {
                    Ok(())
                } else {
                    forbidden()
                };
            }
            check_tenant(principal, scope, tenant, forbidden)
        }
    }
}

fn check_tenant(
    principal: &ResolvedPrincipal,
    scope: Option<AdminScope>,
    tenant: &TenantCode,
    forbidden: impl Fn() -> Result<(), AuthzError>,
) -> Result<(), AuthzError> {
    match scope {
        Some(scope) if scope.covers_tenant(tenant) => Ok(()),
        Some(_) => Err(AuthzError::TenantMismatch),
        None if principal.tenant_id.as_ref().is_some_and(|own| own != tenant) => {
            Err(AuthzError::TenantMismatch)
        }
        None => forbidden(),
    }
}

//! Administrative mode an operation runs under.

use serde::{Deserialize, Serialize};

use crate::id::TenantCode;

/// The administrative mode in effect for an operator action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "tenant")]
pub enum AdminScope {
    /// Platform operators: every tenant, every global record.
    System,
    /// Global support agents: every tenant, but no global records.
    Support,
    /// Confined to one tenant's records.
    Tenant(TenantCode),
}

impl AdminScope {
    /// Whether records owned by `tenant` are visible in this scope.
    pub fn covers_tenant(&self, tenant: &TenantCode) -> bool {
        match self {
            AdminScope::System | AdminScope::Support => true,
            AdminScope::Tenant(own) => own == tenant,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, AdminScope::System)
    }
}

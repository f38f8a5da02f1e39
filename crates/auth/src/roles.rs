use serde::{Deserialize, Serialize};

use opsdesk_core::MemberRole;

/// Role carried by a resolved principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SystemAdmin,
    TenantAdmin,
    UnitAdmin,
    TeamMember,
    SupportAgent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SystemAdmin => "system_admin",
            Role::TenantAdmin => "tenant_admin",
            Role::UnitAdmin => "unit_admin",
            Role::TeamMember => "team_member",
            Role::SupportAgent => "support_agent",
        }
    }
}

impl From<MemberRole> for Role {
    fn from(value: MemberRole) -> Self {
        match value {
            MemberRole::CompanyAdmin => Role::TenantAdmin,
            MemberRole::StoreAdmin => Role::UnitAdmin,
            MemberRole::TeamMember => Role::TeamMember,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

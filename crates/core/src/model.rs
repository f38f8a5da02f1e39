//! Persisted records of the tenant model.
//!
//! # Invariants
//! - A `Unit`'s `company_id` resolves to an existing `Tenant` outside of an
//!   in-flight cascade delete.
//! - A suspended `Tenant` has every owned `Unit` blocked, and vice versa on
//!   reactivation.
//! - Once hashed, every credential carries a non-empty salt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::Entity;
use crate::id::{TenantCode, UnitId, Username};

fn active_by_default() -> bool {
    true
}

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(active_by_default))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tenant / Unit
// ─────────────────────────────────────────────────────────────────────────────

/// A tenant ("company").
///
/// Carries the legacy administrative credential used by direct tenant-admin
/// logins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Mirrors the document key; older documents may omit it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: TenantCode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub admin_username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub admin_password: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password_salt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_suspended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Tenant {
    /// Name shown for the tenant administrator.
    pub fn admin_display_name(&self) -> &str {
        match self.admin_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.name,
        }
    }
}

impl Entity for Tenant {
    type Id = TenantCode;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn storage_key(&self) -> String {
        self.id.to_string()
    }
}

/// A unit ("store") owned by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: UnitId,
    pub company_id: TenantCode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub admin_username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub admin_password: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password_salt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub admin_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_blocked: bool,
}

impl Unit {
    pub fn admin_display_name(&self) -> &str {
        if self.admin_name.trim().is_empty() {
            &self.name
        } else {
            &self.admin_name
        }
    }
}

impl Entity for Unit {
    type Id = UnitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn storage_key(&self) -> String {
        self.id.to_string()
    }
}

/// One-per-unit side record holding the unit's team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<UnitId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team_members: Vec<TeamMember>,
}

impl UnitConfig {
    /// First team member whose username matches, in list order.
    pub fn find_member(&self, username: &Username) -> Option<&TeamMember> {
        self.team_members
            .iter()
            .find(|m| username.matches(&m.username))
    }
}

/// A team member embedded in a unit's config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password_salt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<UnitId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tenant members and global agents
// ─────────────────────────────────────────────────────────────────────────────

/// Role granted by a tenant-member record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberRole {
    #[default]
    CompanyAdmin,
    StoreAdmin,
    TeamMember,
}

/// Tenant-scoped login record, keyed by `"{tenant}__{username}"`.
///
/// `company_id` and `username` are restored from the key on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantMember {
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_id: TenantCode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password_salt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: MemberRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<UnitId>,
    #[serde(default = "active_by_default", deserialize_with = "null_as_active")]
    pub is_active: bool,
}

impl TenantMember {
    pub fn key(company_id: &TenantCode, username: &Username) -> String {
        format!("{company_id}__{username}")
    }
}

impl Entity for TenantMember {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.username
    }

    fn storage_key(&self) -> String {
        Self::key(&self.company_id, &Username::normalize(&self.username))
    }
}

/// Support identity, keyed by username. Tenant-scoped when `company_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportAgent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password_salt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<TenantCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_create_company: bool,
    #[serde(default = "active_by_default", deserialize_with = "null_as_active")]
    pub is_active: bool,
}

impl Entity for SupportAgent {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.username
    }

    fn storage_key(&self) -> String {
        Username::normalize(&self.username).into_string()
    }
}

/// Dynamically provisioned system administrator, keyed by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperAdminAgent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password_salt: String,
    #[serde(default = "active_by_default", deserialize_with = "null_as_active")]
    pub is_active: bool,
}

impl Entity for SuperAdminAgent {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.username
    }

    fn storage_key(&self) -> String {
        Username::normalize(&self.username).into_string()
    }
}

//! Tenant lifecycle operations.
//!
//! ## Consistency Model
//!
//! - Suspend/reactivate: tenant flag and every owned unit's blocked flag in
//!   one atomic commit.
//! - Cascade delete: dependents in sequential batches of at most
//!   `batch_size` deletions, then the tenant record alone. A failed batch
//!   leaves the tenant in place, so re-running the delete picks up whatever
//!   is left.
//! - Single-document edits (one unit, one agent) are plain writes.
//!
//! Nothing here retries; store errors are returned as-is.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use opsdesk_auth::{CredentialHasher, prepare_credential};
use opsdesk_core::validation::{require_non_blank, validate_password, validate_username};
use opsdesk_core::{AdminScope, DomainError, SupportAgent, Tenant, TenantCode, Unit, UnitId, Username};
use opsdesk_infra::collections::{
    COMPANIES, COMPANY_USERS, FEEDBACK, FIELD_COMPANY_ID, FIELD_IS_BLOCKED, FIELD_IS_SUSPENDED,
    FIELD_STORE_ID, STORE_CONFIGS, STORES, SUPPORT_AGENTS, TASKS,
};
use opsdesk_infra::{IdentityStore, IdentityStoreExt, StoredDocument};

use crate::cascade::{CascadeInventory, CascadePlan};
use crate::config::LifecycleConfig;
use crate::error::LifecycleResult;

/// Input for provisioning a tenant with its legacy admin credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTenant {
    pub code: String,
    pub name: String,
    pub admin_username: String,
    pub admin_password: String,
    #[serde(default)]
    pub admin_name: Option<String>,
}

/// Outcome of a completed cascade delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub tenant: TenantCode,
    /// Documents removed, including the tenant record when it still existed.
    pub deleted: usize,
    /// Commits issued.
    pub batches: usize,
}

fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Value {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

pub struct TenantLifecycleManager<S, H> {
    store: S,
    hasher: H,
    config: LifecycleConfig,
}

impl<S, H> TenantLifecycleManager<S, H>
where
    S: IdentityStore,
    H: CredentialHasher,
{
    pub fn new(store: S, hasher: H, config: LifecycleConfig) -> Self {
        Self {
            store,
            hasher,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────

    async fn require_tenant(&self, code: &TenantCode) -> LifecycleResult<Tenant> {
        let tenant: Option<Tenant> = self.store.get_record(COMPANIES, code.as_str()).await?;
        match tenant {
            Some(mut t) => {
                t.id = code.clone();
                Ok(t)
            }
            None => Err(DomainError::not_found(format!("tenant {code}")).into()),
        }
    }

    async fn require_unit(&self, id: &UnitId) -> LifecycleResult<Unit> {
        let unit: Option<Unit> = self.store.get_record(STORES, id.as_str()).await?;
        match unit {
            Some(mut u) => {
                u.id = id.clone();
                Ok(u)
            }
            None => Err(DomainError::not_found(format!("unit {id}")).into()),
        }
    }

    async fn unit_docs(&self, code: &TenantCode) -> LifecycleResult<Vec<StoredDocument>> {
        Ok(self
            .store
            .query_by_field(STORES, FIELD_COMPANY_ID, &Value::from(code.as_str()))
            .await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Suspension
    // ─────────────────────────────────────────────────────────────────────

    /// Flip the tenant's suspension; returns the new value.
    pub async fn toggle_suspension(&self, code: &TenantCode) -> LifecycleResult<bool> {
        let tenant = self.require_tenant(code).await?;
        let suspended = !tenant.is_suspended;
        self.set_suspension(code, suspended).await?;
        Ok(suspended)
    }

    /// Set the tenant's suspension and every owned unit's blocked flag to
    /// `suspended` in one atomic commit.
    pub async fn set_suspension(&self, code: &TenantCode, suspended: bool) -> LifecycleResult<()> {
        self.require_tenant(code).await?;
        let units = self.unit_docs(code).await?;

        let mut batch = self.store.batch();
        batch.update(
            COMPANIES,
            code.as_str(),
            fields([(FIELD_IS_SUSPENDED, Value::Bool(suspended))]),
        );
        for unit in &units {
            batch.update(
                STORES,
                &unit.key,
                fields([(FIELD_IS_BLOCKED, Value::Bool(suspended))]),
            );
        }

        if let Err(err) = self.store.commit(batch).await {
            error!(tenant_id = %code, suspended, error = %err, "suspension commit failed");
            return Err(err.into());
        }
        info!(tenant_id = %code, suspended, units = units.len(), "tenant suspension updated");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cascade delete
    // ─────────────────────────────────────────────────────────────────────

    /// Read everything `code` owns and order it for deletion. Writes nothing.
    ///
    /// A tenant that no longer exists yields a plan with no dependents.
    pub async fn plan_tenant_deletion(&self, code: &TenantCode) -> LifecycleResult<CascadePlan> {
        let mut inventory = CascadeInventory::default();

        for unit in self.unit_docs(code).await? {
            let owner = Value::from(unit.key.as_str());
            for task in self.store.query_by_field(TASKS, FIELD_STORE_ID, &owner).await? {
                inventory.tasks.push(task.key);
            }
            for item in self.store.query_by_field(FEEDBACK, FIELD_STORE_ID, &owner).await? {
                inventory.feedback.push(item.key);
            }
            if self.store.get_by_key(STORE_CONFIGS, &unit.key).await?.is_some() {
                inventory.unit_configs.push(unit.key.clone());
            }
            inventory.units.push(unit.key);
        }

        let members = self
            .store
            .query_by_field(COMPANY_USERS, FIELD_COMPANY_ID, &Value::from(code.as_str()))
            .await?;
        inventory.members = members.into_iter().map(|m| m.key).collect();

        Ok(CascadePlan::build(code.clone(), inventory))
    }

    /// Delete the tenant and everything it owns.
    ///
    /// Safe to re-run after a partial failure or a completed delete.
    pub async fn delete_tenant(&self, code: &TenantCode) -> LifecycleResult<CascadeReport> {
        let plan = self.plan_tenant_deletion(code).await?;
        let tenant_doc = plan.tenant_doc();
        let tenant_exists = self
            .store
            .get_by_key(tenant_doc.collection, &tenant_doc.key)
            .await?
            .is_some();
        let batches = plan.batches(self.config.batch_size);
        let total = batches.len() + usize::from(tenant_exists);
        let mut deleted = 0;

        for (index, batch) in batches.into_iter().enumerate() {
            let ops = batch.len();
            if let Err(err) = self.store.commit(batch).await {
                error!(
                    tenant_id = %code,
                    batch = index + 1,
                    of = total,
                    error = %err,
                    "cascade batch failed; tenant record kept"
                );
                return Err(err.into());
            }
            deleted += ops;
            debug!(tenant_id = %code, batch = index + 1, of = total, ops, "cascade batch committed");
        }

        if tenant_exists {
            let mut last = self.store.batch();
            last.delete(tenant_doc.collection, &tenant_doc.key);
            if let Err(err) = self.store.commit(last).await {
                error!(tenant_id = %code, error = %err, "tenant record delete failed");
                return Err(err.into());
            }
            deleted += 1;
        }

        info!(tenant_id = %code, deleted, batches = total, "tenant deleted");
        Ok(CascadeReport {
            tenant: code.clone(),
            deleted,
            batches: total,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scoped single-record edits
    // ─────────────────────────────────────────────────────────────────────

    /// Delete one unit record. Its config and dependents are left alone.
    pub async fn delete_unit(&self, scope: &AdminScope, id: &UnitId) -> LifecycleResult<()> {
        let unit = self.require_unit(id).await?;
        if !scope.covers_tenant(&unit.company_id) {
            return Err(DomainError::Unauthorized.into());
        }
        self.store.delete(STORES, id.as_str()).await?;
        info!(tenant_id = %unit.company_id, unit_id = %id, "unit deleted");
        Ok(())
    }

    /// Delete one support agent.
    ///
    /// Tenant-bound agents may be removed by any scope covering their tenant;
    /// global agents only in system scope.
    pub async fn delete_support_agent(
        &self,
        scope: &AdminScope,
        username: &Username,
    ) -> LifecycleResult<()> {
        let agent: Option<SupportAgent> =
            self.store.get_record(SUPPORT_AGENTS, username.as_str()).await?;
        let Some(agent) = agent else {
            return Err(DomainError::not_found(format!("support agent {username}")).into());
        };

        let allowed = match &agent.company_id {
            Some(tenant) => scope.covers_tenant(tenant),
            None => scope.is_system(),
        };
        if !allowed {
            return Err(DomainError::Unauthorized.into());
        }

        self.store.delete(SUPPORT_AGENTS, username.as_str()).await?;
        info!(username = %username, "support agent deleted");
        Ok(())
    }

    /// Block or unblock a single unit.
    ///
    /// Unblocking is refused while the owning tenant is suspended.
    pub async fn set_unit_blocked(
        &self,
        scope: &AdminScope,
        id: &UnitId,
        blocked: bool,
    ) -> LifecycleResult<()> {
        let unit = self.require_unit(id).await?;
        if !scope.covers_tenant(&unit.company_id) {
            return Err(DomainError::Unauthorized.into());
        }
        if !blocked {
            let tenant = self.require_tenant(&unit.company_id).await?;
            if tenant.is_suspended {
                return Err(DomainError::invariant(format!(
                    "unit {id} cannot be unblocked while tenant {} is suspended",
                    unit.company_id
                ))
                .into());
            }
        }

        let mut batch = self.store.batch();
        batch.update(STORES, id.as_str(), fields([(FIELD_IS_BLOCKED, Value::Bool(blocked))]));
        self.store.commit(batch).await?;
        info!(tenant_id = %unit.company_id, unit_id = %id, blocked, "unit block updated");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Provisioning and credentials
    // ─────────────────────────────────────────────────────────────────────

    pub async fn provision_tenant(&self, new: NewTenant) -> LifecycleResult<Tenant> {
        let code = TenantCode::parse(&new.code)?;
        let name = require_non_blank("name", &new.name)?.to_string();
        let admin_username = Username::normalize(&new.admin_username);
        validate_username(admin_username.as_str())?;
        validate_password(&new.admin_password)?;

        if self.store.get_by_key(COMPANIES, code.as_str()).await?.is_some() {
            return Err(DomainError::conflict(format!("tenant {code} already exists")).into());
        }

        let credential = prepare_credential(&self.hasher, &new.admin_password, None)?;
        let tenant = Tenant {
            id: code.clone(),
            name,
            admin_username: admin_username.into_string(),
            admin_password: credential.password,
            password_salt: credential.salt,
            admin_name: new.admin_name.filter(|n| !n.trim().is_empty()),
            is_suspended: false,
            created_at: Some(Utc::now()),
        };
        self.store.put_entity(COMPANIES, &tenant).await?;

        info!(tenant_id = %code, "tenant provisioned");
        Ok(tenant)
    }

    /// Replace the tenant's legacy admin username and credential.
    pub async fn rotate_tenant_credential(
        &self,
        code: &TenantCode,
        username: &str,
        password: &str,
    ) -> LifecycleResult<()> {
        let username = Username::normalize(username);
        validate_username(username.as_str())?;
        validate_password(password)?;

        let tenant = self.require_tenant(code).await?;
        let credential = prepare_credential(&self.hasher, password, Some(&tenant.password_salt))?;

        let mut batch = self.store.batch();
        batch.update(
            COMPANIES,
            code.as_str(),
            fields([
                ("adminUsername", Value::from(username.as_str())),
                ("adminPassword", Value::from(credential.password)),
                ("passwordSalt", Value::from(credential.salt)),
            ]),
        );
        self.store.commit(batch).await?;

        info!(tenant_id = %code, "tenant credential rotated");
        Ok(())
    }
}

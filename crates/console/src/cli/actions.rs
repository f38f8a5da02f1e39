use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use opsdesk_auth::{Capability, CredentialResolver, ResolverConfig, Sha256Hasher, authorize};
use opsdesk_core::TenantCode;
use opsdesk_infra::{InMemoryIdentityStore, WriteBatch};
use opsdesk_tenancy::{LifecycleConfig, TenantLifecycleManager};

use crate::cli::globals::GlobalArgs;

type Store = Arc<InMemoryIdentityStore>;

/// Exit status for a login that resolved to a decline.
const DECLINED: u8 = 2;

pub enum Action {
    Login {
        tenant: String,
        username: String,
        password: String,
    },
    Suspend {
        tenant: TenantCode,
        set: Option<bool>,
    },
    Delete {
        tenant: TenantCode,
    },
    Plan {
        tenant: TenantCode,
        batches: bool,
    },
}

impl Action {
    /// Run against the snapshot named in `globals`. Writing commands save
    /// the snapshot back, including after a partial cascade.
    pub async fn execute(self, globals: &GlobalArgs) -> Result<ExitCode> {
        let store: Store = Arc::new(load_snapshot(&globals.snapshot).await?);
        let resolver = CredentialResolver::new(
            Arc::clone(&store),
            Sha256Hasher,
            ResolverConfig::from_env(),
        );
        let manager = TenantLifecycleManager::new(
            Arc::clone(&store),
            Sha256Hasher,
            LifecycleConfig::from_env(),
        );

        match self {
            Action::Login {
                tenant,
                username,
                password,
            } => match resolver.resolve(&tenant, &username, &password).await {
                Ok(principal) => {
                    print_json(&json!({ "resolved": principal }))?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(decline) => {
                    print_json(&json!({
                        "declined": decline,
                        "kind": decline.kind(),
                        "message": decline.to_string(),
                    }))?;
                    Ok(ExitCode::from(DECLINED))
                }
            },
            Action::Plan { tenant, batches } => {
                let plan = manager.plan_tenant_deletion(&tenant).await?;
                let mut out = json!({
                    "tenant": plan.tenant,
                    "dependents": plan.dependents(),
                    "tenantDoc": plan.tenant_doc(),
                    "totalDeletions": plan.total_deletions(),
                });
                if batches {
                    let sizes: Vec<usize> = plan
                        .batches(manager.config().batch_size)
                        .iter()
                        .map(WriteBatch::len)
                        .collect();
                    out["batchSizes"] = Value::from(sizes);
                }
                print_json(&out)?;
                Ok(ExitCode::SUCCESS)
            }
            Action::Suspend { tenant, set } => {
                require_operator(&resolver, globals, &Capability::ManageTenants).await?;
                let suspended = match set {
                    Some(value) => {
                        manager.set_suspension(&tenant, value).await?;
                        value
                    }
                    None => manager.toggle_suspension(&tenant).await?,
                };
                save_snapshot(&store, &globals.snapshot).await?;
                print_json(&json!({ "tenant": tenant, "suspended": suspended }))?;
                Ok(ExitCode::SUCCESS)
            }
            Action::Delete { tenant } => {
                require_operator(&resolver, globals, &Capability::ManageTenants).await?;
                let outcome = manager.delete_tenant(&tenant).await;
                save_snapshot(&store, &globals.snapshot).await?;
                print_json(&outcome?)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn require_operator(
    resolver: &CredentialResolver<Store, Sha256Hasher>,
    globals: &GlobalArgs,
    required: &Capability,
) -> Result<()> {
    let (Some(username), Some(password)) = (&globals.operator, &globals.operator_password) else {
        bail!("--operator and --operator-password are required for this command");
    };

    let principal = resolver
        .resolve(&globals.operator_tenant, username, password)
        .await
        .context("operator login declined")?;
    authorize(&principal, required)
        .map_err(|e| anyhow!("operator '{}' not permitted: {e}", principal.username))?;

    info!(operator = %principal.username, role = %principal.role, "operator authorized");
    Ok(())
}

async fn load_snapshot(path: &Path) -> Result<InMemoryIdentityStore> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    Ok(InMemoryIdentityStore::from_snapshot(value)?)
}

async fn save_snapshot(store: &InMemoryIdentityStore, path: &Path) -> Result<()> {
    let body = serde_json::to_string_pretty(&store.snapshot()?)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("writing snapshot {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

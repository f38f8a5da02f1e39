use anyhow::{Context, Result, anyhow};

use opsdesk_core::TenantCode;

use crate::cli::actions::Action;

fn tenant_arg(sub: &clap::ArgMatches) -> Result<TenantCode> {
    let raw = sub
        .get_one::<String>("tenant")
        .ok_or_else(|| anyhow!("missing required argument: <tenant>"))?;
    TenantCode::parse(raw).with_context(|| format!("invalid tenant code '{raw}'"))
}

fn string_arg(sub: &clap::ArgMatches, name: &str) -> String {
    sub.get_one::<String>(name).cloned().unwrap_or_default()
}

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("login", sub)) => Ok(Action::Login {
            tenant: string_arg(sub, "tenant"),
            username: string_arg(sub, "username"),
            password: string_arg(sub, "password"),
        }),
        Some(("suspend", sub)) => Ok(Action::Suspend {
            tenant: tenant_arg(sub)?,
            set: sub.get_one::<bool>("set").copied(),
        }),
        Some(("delete", sub)) => Ok(Action::Delete {
            tenant: tenant_arg(sub)?,
        }),
        Some(("plan", sub)) => Ok(Action::Plan {
            tenant: tenant_arg(sub)?,
            batches: sub.get_flag("batches"),
        }),
        _ => Err(anyhow!("unknown or missing subcommand")),
    }
}

use std::path::PathBuf;

use anyhow::{Result, anyhow};

/// Arguments shared by every subcommand.
#[derive(Clone)]
pub struct GlobalArgs {
    pub snapshot: PathBuf,
    pub operator: Option<String>,
    pub operator_password: Option<String>,
    pub operator_tenant: String,
}

impl GlobalArgs {
    pub fn from_matches(matches: &clap::ArgMatches) -> Result<Self> {
        let snapshot = matches
            .get_one::<String>("snapshot")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("missing required argument: --snapshot"))?;

        Ok(Self {
            snapshot,
            operator: matches.get_one::<String>("operator").cloned(),
            operator_password: matches.get_one::<String>("operator-password").cloned(),
            operator_tenant: matches
                .get_one::<String>("operator-tenant")
                .cloned()
                .unwrap_or_default(),
        })
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("snapshot", &self.snapshot)
            .field("operator", &self.operator)
            .field("operator_password", &self.operator_password.as_ref().map(|_| "<redacted>"))
            .field("operator_tenant", &self.operator_tenant)
            .finish()
    }
}

//! `opsdesk-console`: operator tool over a JSON snapshot of the identity
//! store.

mod cli;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let (action, globals) = cli::start()?;
    action.execute(&globals).await
}

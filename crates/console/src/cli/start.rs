use anyhow::Result;

use opsdesk_observability::LogFormat;

use crate::cli::{actions::Action, commands, dispatch, globals::GlobalArgs};

/// Parse arguments and set up logging.
pub fn start() -> Result<(Action, GlobalArgs)> {
    let matches = commands::new().get_matches();

    let format = matches
        .get_one::<String>("log-format")
        .map(String::as_str)
        .map_or(LogFormat::Json, LogFormat::parse);
    opsdesk_observability::tracing::init(format);

    let globals = GlobalArgs::from_matches(&matches)?;
    let action = dispatch::handler(&matches)?;
    Ok((action, globals))
}

use clap::{Arg, ArgAction, Command};

pub fn new() -> Command {
    let tenant = || {
        Arg::new("tenant")
            .help("Tenant code, e.g. ACME01")
            .required(true)
    };

    Command::new("opsdesk-console")
        .about("Tenant login resolution and lifecycle operations")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg(
            Arg::new("snapshot")
                .short('s')
                .long("snapshot")
                .help("Identity store snapshot (JSON: {collection: {key: document}})")
                .env("OPSDESK_SNAPSHOT")
                .required(true),
        )
        .arg(
            Arg::new("operator")
                .long("operator")
                .help("Operator username; required for commands that write")
                .env("OPSDESK_OPERATOR"),
        )
        .arg(
            Arg::new("operator-password")
                .long("operator-password")
                .help("Operator password")
                .env("OPSDESK_OPERATOR_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("operator-tenant")
                .long("operator-tenant")
                .help("Tenant context for the operator login, if any")
                .env("OPSDESK_OPERATOR_TENANT"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .help("Log output on stderr: json or compact")
                .env("OPSDESK_LOG_FORMAT")
                .default_value("json"),
        )
        .subcommand(
            Command::new("login")
                .about("Resolve a login and print the principal or decline reason")
                .arg(
                    Arg::new("tenant")
                        .short('t')
                        .long("tenant")
                        .help("Tenant code; omit for global identities"),
                )
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .env("OPSDESK_LOGIN_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("suspend")
                .about("Toggle (or set) a tenant's suspension and its units' blocking")
                .arg(tenant())
                .arg(
                    Arg::new("set")
                        .long("set")
                        .help("Set suspension explicitly instead of toggling")
                        .value_parser(clap::value_parser!(bool)),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Cascade-delete a tenant and everything it owns")
                .arg(tenant()),
        )
        .subcommand(
            Command::new("plan")
                .about("Print the cascade-delete plan for a tenant without writing")
                .arg(tenant())
                .arg(
                    Arg::new("batches")
                        .long("batches")
                        .help("Also print how the plan splits into commits")
                        .action(ArgAction::SetTrue),
                ),
        )
}

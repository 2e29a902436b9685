use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Payment tokens never come from the environment, but keep the list explicit anyway
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "RDS_HOST",
        "RDS_PORT",
        "RDS_DATABASE_URL",
        "RDS_RUN_MIGRATIONS",
        "RDS_MATCHING_INTERVAL_MS",
        "RDS_MAX_DISPATCH_RADIUS",
        "RDS_DEFAULT_CHAIR_SPEED",
        "RDS_NOTIFICATION_RETRY_MS",
        "RDS_PAYMENT_GATEWAY_URL",
        "RDS_PAYMENT_MAX_ATTEMPTS",
        "RDS_PAYMENT_RETRY_DELAY_MS",
    ];

    println!("Current environment values:");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}

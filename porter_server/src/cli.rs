use std::{env, env::VarError};

/// There's no real CLI for the dashboard, so just do quick 'n dirty
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
    // VIVID_API_TOKEN and PORTER_WAREHOUSE_URL are left out on purpose
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "PORTER_HOST",
        "PORTER_PORT",
        "PORTER_EXPORT_DIR",
        "PORTER_SNAPSHOT_PATTERN",
        "PORTER_ENRICHMENT_THRESHOLD",
        "PORTER_LOAD_SNAPSHOTS",
        "PORTER_WAREHOUSE_TABLE",
        "VIVID_API_URL",
        "VIVID_API_TIMEOUT",
        "VIVID_TRANSFER_SOURCE",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}

use std::path::Path;

use {
    anyhow::Result,
    clap::Subcommand,
    remoql_config::{RemoqlConfig, Severity, validate_config},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration and report errors/warnings.
    Check,
    /// Print the effective configuration as TOML.
    Show,
}

pub fn handle_config(action: ConfigAction, path: Option<&Path>, config: &RemoqlConfig) -> Result<()> {
    match action {
        ConfigAction::Check => check(path, config),
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(path: Option<&Path>, config: &RemoqlConfig) -> Result<()> {
    match path
        .map(Path::to_path_buf)
        .or_else(remoql_config::find_config_file)
    {
        Some(path) => eprintln!("Checking {}\n", path.display()),
        None => eprintln!("No config file found; checking defaults.\n"),
    }

    let result = validate_config(config);
    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("\n{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

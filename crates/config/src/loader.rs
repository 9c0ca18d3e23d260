use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::RemoqlConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["remoql.toml", "remoql.yaml", "remoql.yml", "remoql.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<RemoqlConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path).with_context(|| format!("failed to parse {}", path.display()))
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./remoql.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/remoql/remoql.{toml,yaml,yml,json}` (user-global)
///
/// Returns `RemoqlConfig::default()` if no config file is found or the file
/// cannot be loaded.
pub fn discover_and_load() -> RemoqlConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    RemoqlConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/remoql/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "remoql").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<RemoqlConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

//! Configuration loading, validation, and env substitution.
//!
//! Config files: `remoql.toml`, `remoql.yaml`, or `remoql.json`
//! Searched in `./` then `~/.config/remoql/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, find_config_file, load_config},
    schema::{
        AccessConfig, GraphqlConfig, LoggingConfig, OrganizationEntry, RemoqlConfig, ServerConfig,
        TenancyConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate_config},
};

mod config_commands;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    remoql_config::{RemoqlConfig, validate_config},
    remoql_gateway::{DirectoryModel, GatewayState},
    remoql_model::RemoteModel,
    tracing::{error, info, warn},
};

#[derive(Parser)]
#[command(name = "remoql", about = "remoql, a GraphQL gateway over remote data models")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (overrides discovery of ./remoql.toml and ~/.config/remoql/).
    #[arg(long, global = true, env = "REMOQL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overrides config value).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Serve,
    /// Print the generated schema as SDL.
    Schema,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn load(cli: &Cli) -> anyhow::Result<RemoqlConfig> {
    let mut config = match &cli.config {
        Some(path) => remoql_config::load_config(path)?,
        None => remoql_config::discover_and_load(),
    };
    if let Some(bind) = &cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    Ok(config)
}

/// The built-in directory model named after the configured tenant model.
fn gateway_state(config: &RemoqlConfig) -> anyhow::Result<GatewayState> {
    let models: Vec<Arc<dyn RemoteModel>> = vec![Arc::new(DirectoryModel::new(
        config.graphql.tenant_model.clone(),
        config.tenancy.organizations.clone(),
    ))];
    GatewayState::from_config(config, models)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = load(&cli)?;

    match cli.command {
        // Default: start gateway when no subcommand is provided
        None | Some(Commands::Serve) => {
            remoql_gateway::init_tracing(&config.logging)?;
            info!(version = env!("CARGO_PKG_VERSION"), "remoql starting");

            let result = validate_config(&config);
            for d in &result.diagnostics {
                match d.severity {
                    remoql_config::Severity::Error => error!(path = %d.path, "{}", d.message),
                    remoql_config::Severity::Warning => warn!(path = %d.path, "{}", d.message),
                }
            }
            if result.has_errors() {
                anyhow::bail!("invalid configuration");
            }

            let state = gateway_state(&config)?;
            remoql_gateway::serve(&config.server.address(), Arc::new(state)).await
        },
        Some(Commands::Schema) => {
            let state = gateway_state(&config)?;
            println!("{}", state.schema.sdl());
            Ok(())
        },
        Some(Commands::Config { action }) => {
            config_commands::handle_config(action, cli.config.as_deref(), &config)
        },
    }
}

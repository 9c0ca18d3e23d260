use {
    anyhow::Context,
    remoql_config::LoggingConfig,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

/// Install the global subscriber. `RUST_LOG` wins over `config.level`.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("invalid log level {:?}", config.level))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(false).with_thread_ids(false))
            .try_init()?;
    }
    Ok(())
}

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Structured logs go to stderr so stdout stays pure JSON.
pub(crate) fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        default_filter(Level::DEBUG)?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| default_filter(Level::WARN))?
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

fn default_filter(level: Level) -> Result<EnvFilter> {
    EnvFilter::try_new(format!("astrometry_core={level},astrometry_cli={level}"))
        .map_err(|e| anyhow!("failed to create log filter: {e}"))
}

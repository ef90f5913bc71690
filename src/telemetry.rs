//! Logging setup for discheck.
//!
//! Logs go to stderr so stdout only carries check results.

use {
    crate::config::TelemetryConfig,
    tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter},
};

/// Install the global subscriber. `RUST_LOG` wins over the configured level;
/// `quiet` lowers the configured level to errors only.
pub fn init(
    config: &TelemetryConfig,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = if quiet { "error" } else { config.log_level.as_str() };
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

//! Logging setup for the simulator binary
//!
//! Logs go to stderr so they don't interleave with the dialog on stdout.

use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `level` when set.
pub fn setup_logging(level: &str) -> Result<()> {
    let level = Level::from_str(level).with_context(|| format!("Invalid log level: {}", level))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Log a welcome message with version info
pub fn log_welcome(app_name: &str, version: &str) {
    tracing::info!("Starting {} v{}", app_name, version);
}

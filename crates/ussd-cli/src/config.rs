//! Command-line arguments and configuration resolution
//!
//! Precedence: flags > environment > config file > built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rvoip_ussd_core::UssdConfig;

#[derive(Debug, Parser)]
#[command(name = "ussd-sim", version, about = "Interactive USSD handset simulator")]
pub struct Cli {
    /// TOML configuration file (defaults to <config dir>/rvoip/ussd.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Backend endpoint receiving one POST per turn
    #[arg(long, env = "USSD_API_URL")]
    pub api_url: Option<String>,

    /// Per-turn timeout in milliseconds
    #[arg(long, env = "USSD_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Simulated MSISDN
    #[arg(long, env = "USSD_PHONE_NUMBER")]
    pub phone_number: Option<String>,

    /// Dial this code immediately on startup
    #[arg(long)]
    pub dial: Option<String>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("rvoip").join("ussd.toml"))
        .filter(|path| path.is_file())
}

impl Cli {
    /// Build the simulator configuration from all sources
    pub fn resolve_config(&self) -> Result<UssdConfig> {
        self.resolve_with_fallback(default_config_path())
    }

    /// Like [`resolve_config`](Self::resolve_config), with `fallback` used
    /// when no `--config` was given
    fn resolve_with_fallback(&self, fallback: Option<PathBuf>) -> Result<UssdConfig> {
        let file = self.config.clone().or(fallback);

        let mut config = match &file {
            Some(path) => UssdConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => UssdConfig::default(),
        };

        if let Some(url) = &self.api_url {
            config = config.with_api_url(url.clone());
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_request_timeout(Duration::from_millis(ms));
        }
        if let Some(number) = &self.phone_number {
            config = config.with_phone_number(number.clone());
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

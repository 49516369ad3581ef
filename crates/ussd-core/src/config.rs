//! Simulator configuration
//!
//! [`UssdConfig`] carries the handful of values that are fixed for the
//! lifetime of a simulator instance: where the backend lives, how long a
//! turn may take, and which MSISDN the simulated handset presents.
//!
//! ```rust
//! use rvoip_ussd_core::UssdConfig;
//! use std::time::Duration;
//!
//! let config = UssdConfig::new()
//!     .with_api_url("http://ussd.internal:8080/api/ussd")
//!     .with_request_timeout(Duration::from_secs(5))
//!     .with_phone_number("237670000001");
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.phone_number, "237670000001");
//! ```
//!
//! Configuration files use TOML with millisecond durations:
//!
//! ```toml
//! api_url = "http://localhost:8080/api/ussd"
//! request_timeout_ms = 8000
//! phone_number = "237690123456"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{UssdError, UssdResult};

/// Default backend endpoint
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/ussd";
/// Default bounded wait for one turn
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(8000);
/// Default TCP connect timeout for the HTTP transport
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Default simulated MSISDN
pub const DEFAULT_PHONE_NUMBER: &str = "237690123456";
/// Default duration of the dialog exit animation
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(250);
/// Default composer capacity, also the largest one accepted
pub const DEFAULT_MAX_DIAL_LENGTH: usize = 20;

/// Configuration for a simulator instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UssdConfig {
    /// Backend endpoint receiving one POST per turn
    pub api_url: String,
    /// Bounded wait for a turn's reply
    #[serde(rename = "request_timeout_ms", with = "duration_ms")]
    pub request_timeout: Duration,
    /// HTTP connect timeout
    #[serde(rename = "connect_timeout_ms", with = "duration_ms")]
    pub connect_timeout: Duration,
    /// MSISDN sent with every turn
    pub phone_number: String,
    /// How long the Closing state lasts before state is torn down
    #[serde(rename = "close_delay_ms", with = "duration_ms")]
    pub close_delay: Duration,
    /// Maximum number of characters the composer accepts, at most 20
    pub max_dial_length: usize,
}

impl Default for UssdConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            phone_number: DEFAULT_PHONE_NUMBER.to_string(),
            close_delay: DEFAULT_CLOSE_DELAY,
            max_dial_length: DEFAULT_MAX_DIAL_LENGTH,
        }
    }
}

impl UssdConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend endpoint
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the per-turn timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the HTTP connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the simulated MSISDN
    pub fn with_phone_number(mut self, number: impl Into<String>) -> Self {
        self.phone_number = number.into();
        self
    }

    /// Set the exit animation duration
    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    /// Set the composer capacity
    pub fn with_max_dial_length(mut self, len: usize) -> Self {
        self.max_dial_length = len;
        self
    }

    /// Load a configuration from a TOML file
    ///
    /// Missing keys fall back to their defaults. The result is validated.
    pub fn from_toml_file(path: impl AsRef<Path>) -> UssdResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| UssdError::ConfigFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&contents).map_err(|e| match e {
            UssdError::ConfigFile { reason, .. } => UssdError::ConfigFile {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        tracing::debug!("Loaded USSD configuration from {}", path.display());
        Ok(config)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(contents: &str) -> UssdResult<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| UssdError::ConfigFile {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> UssdResult<()> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| UssdError::invalid_config("api_url", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UssdError::invalid_config(
                "api_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(UssdError::invalid_config("request_timeout", "must be greater than zero"));
        }

        if self.connect_timeout.is_zero() {
            return Err(UssdError::invalid_config("connect_timeout", "must be greater than zero"));
        }

        if self.phone_number.is_empty() {
            return Err(UssdError::invalid_config("phone_number", "cannot be empty"));
        }
        if !self.phone_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(UssdError::invalid_config("phone_number", "must contain digits only"));
        }

        if self.max_dial_length == 0 {
            return Err(UssdError::invalid_config("max_dial_length", "must be greater than zero"));
        }
        if self.max_dial_length > DEFAULT_MAX_DIAL_LENGTH {
            return Err(UssdError::invalid_config(
                "max_dial_length",
                format!("cannot exceed {} characters", DEFAULT_MAX_DIAL_LENGTH),
            ));
        }

        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
